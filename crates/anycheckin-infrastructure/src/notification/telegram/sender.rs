use async_trait::async_trait;
use log::{info, warn};

use anycheckin_domain::notification::CheckInNotifier;
use anycheckin_domain::shared::DomainError;

impl super::TelegramNotifier {
    /// Sends pre-rendered HTML text. A disabled notifier does nothing.
    pub async fn send_text(&self, text: &str) -> Result<(), DomainError> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.config.bot_token.is_empty() || self.config.chat_id.is_empty() {
            return Err(DomainError::Validation(
                "Telegram configuration is incomplete (bot_token and chat_id are required)"
                    .to_string(),
            ));
        }

        let response = self
            .client
            .post(self.build_send_url())
            .json(&self.build_payload(text))
            .send()
            .await
            .map_err(|e| {
                DomainError::Infrastructure(format!("Failed to send Telegram notification: {}", e))
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Telegram API returned {}: {}", status, body);
            return Err(DomainError::Infrastructure(format!(
                "Telegram API returned {}",
                status.as_u16()
            )));
        }

        info!("✅ Telegram notification sent");
        Ok(())
    }
}

#[async_trait]
impl CheckInNotifier for super::TelegramNotifier {
    async fn notify(
        &self,
        display_name: &str,
        success: bool,
        message: &str,
    ) -> Result<(), DomainError> {
        if !self.config.enabled {
            return Ok(());
        }
        let text = self.render(display_name.trim(), success, message);
        self.send_text(&text).await
    }
}
