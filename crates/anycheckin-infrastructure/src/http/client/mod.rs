//! Client for the check-in site.
//!
//! Every operation builds its own `reqwest` client with a private cookie
//! jar, so sessions of different accounts never share cookies. Requests are
//! not retried.

mod check_in;
mod types;
mod user_info;

pub use types::{is_unauthorized_message, quota_to_balance, AccountProfile, SiteError};

use log::{debug, warn};
use reqwest::cookie::Jar;
use reqwest::{header, Client};
use std::sync::Arc;
use url::Url;

use crate::config::SiteConfig;
use anycheckin_domain::challenge::{self, COOKIE_NAME};
use anycheckin_domain::session::extract_session_value;

pub struct SiteClient {
    config: SiteConfig,
    base: Url,
}

impl SiteClient {
    pub fn new(config: SiteConfig) -> Result<Self, SiteError> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| SiteError::Transport(format!("invalid base url: {}", e)))?;
        Ok(Self { config, base })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Fresh client whose jar already carries the account's session cookie.
    fn session_client(&self, session: &str) -> Result<(Client, Arc<Jar>), SiteError> {
        let value = extract_session_value(session);
        if value.is_empty() {
            return Err(SiteError::EmptySession);
        }

        let jar = Arc::new(Jar::default());
        jar.add_cookie_str(&format!("session={}", value), &self.base);

        let mut builder = Client::builder()
            .user_agent(&self.config.user_agent)
            .cookie_provider(Arc::clone(&jar))
            .timeout(self.config.timeout());

        if let Some(proxy) = self.config.proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy)
                    .map_err(|e| SiteError::Transport(format!("invalid proxy: {}", e)))?,
            );
        }

        let client = builder
            .build()
            .map_err(|e| SiteError::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok((client, jar))
    }

    /// Loads the home page and, when it carries a challenge, stores the
    /// solved cookie in `jar`. A page without a challenge is not an error.
    async fn solve_challenge(
        &self,
        client: &Client,
        jar: &Jar,
        accept: &'static str,
    ) -> Result<(), SiteError> {
        let response = client
            .get(self.endpoint("/"))
            .header(header::ACCEPT, accept)
            .header(header::ACCEPT_LANGUAGE, self.accept_language()?)
            .send()
            .await?;
        let body = response.text().await?;

        match challenge::extract_arg1(&body) {
            Some(arg1) => {
                let cookie = challenge::solve(&arg1)?;
                debug!("Solved {} challenge for {}", COOKIE_NAME, self.base_url());
                jar.add_cookie_str(&format!("{}={}", COOKIE_NAME, cookie), &self.base);
            }
            None => warn!("⚠️  No challenge found on {}, continuing without it", self.base_url()),
        }
        Ok(())
    }

    fn accept_language(&self) -> Result<header::HeaderValue, SiteError> {
        header::HeaderValue::from_str(&self.config.accept_language)
            .map_err(|e| SiteError::Transport(format!("invalid accept-language: {}", e)))
    }
}
