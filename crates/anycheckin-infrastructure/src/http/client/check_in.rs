use log::info;
use reqwest::{header, StatusCode};

use super::types::{JSON_ACCEPT, REFERER_PATH, SIGN_IN_PATH};
use super::SiteError;

impl super::SiteClient {
    /// Signs in for the day and returns the raw response body.
    ///
    /// Whether the body means success is up to the caller.
    pub async fn check_in(&self, session: &str) -> Result<String, SiteError> {
        let (client, jar) = self.session_client(session)?;
        self.solve_challenge(&client, &jar, JSON_ACCEPT).await?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(JSON_ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, self.accept_language()?);
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
        headers.insert(
            header::ORIGIN,
            header::HeaderValue::from_str(self.base_url())
                .map_err(|e| SiteError::Transport(e.to_string()))?,
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&self.endpoint(REFERER_PATH))
                .map_err(|e| SiteError::Transport(e.to_string()))?,
        );

        let response = client
            .post(self.endpoint(SIGN_IN_PATH))
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        info!("Check-in response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| SiteError::Transport(format!("failed to read check-in response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SiteError::SessionInvalid(format!("HTTP {}: {}", status, body)));
        }
        if !status.is_success() {
            return Err(SiteError::Transport(format!("HTTP {}: {}", status, body)));
        }

        Ok(body)
    }
}
