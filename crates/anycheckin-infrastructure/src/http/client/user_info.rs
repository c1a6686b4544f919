use log::{info, warn};
use reqwest::{header, StatusCode};

use super::types::{is_unauthorized_message, SelfResponse, JSON_ACCEPT, HTML_ACCEPT, SELF_PATH, USER_ID_HEADER};
use super::{AccountProfile, SiteError};

impl super::SiteClient {
    /// Fetches identity and balance for a session.
    ///
    /// `user_id_hint > 0` is sent as the `new-api-user` header; if the site
    /// rejects the session with it, the request is repeated once without.
    pub async fn fetch_self(
        &self,
        session: &str,
        user_id_hint: i64,
    ) -> Result<AccountProfile, SiteError> {
        match self.fetch_self_once(session, user_id_hint).await {
            Err(SiteError::SessionInvalid(reason)) if user_id_hint > 0 => {
                warn!(
                    "⚠️  Session rejected with user id {} ({}), retrying without it",
                    user_id_hint, reason
                );
                self.fetch_self_once(session, 0).await
            }
            other => other,
        }
    }

    async fn fetch_self_once(
        &self,
        session: &str,
        user_id: i64,
    ) -> Result<AccountProfile, SiteError> {
        let (client, jar) = self.session_client(session)?;
        self.solve_challenge(&client, &jar, HTML_ACCEPT).await?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(JSON_ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, self.accept_language()?);
        headers.insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));
        if user_id > 0 {
            headers.insert(USER_ID_HEADER, header::HeaderValue::from(user_id));
        }

        let response = client
            .get(self.endpoint(SELF_PATH))
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SiteError::Transport(format!("failed to read profile response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SiteError::SessionInvalid(format!("HTTP {}", status)));
        }
        if status != StatusCode::OK {
            return Err(SiteError::Transport(format!("HTTP {}", status)));
        }

        let payload: SelfResponse = serde_json::from_str(&body)
            .map_err(|e| SiteError::Remote(format!("invalid profile response: {}", e)))?;

        if !payload.success {
            if is_unauthorized_message(&payload.message) {
                return Err(SiteError::SessionInvalid(payload.message));
            }
            let message = if payload.message.is_empty() {
                "request failed".to_string()
            } else {
                payload.message
            };
            return Err(SiteError::Remote(message));
        }

        let profile = AccountProfile::from(payload.data);
        info!(
            "✅ Profile fetched for user {} ({}), balance {:.2}",
            profile.user_id, profile.username, profile.balance
        );
        Ok(profile)
    }
}
