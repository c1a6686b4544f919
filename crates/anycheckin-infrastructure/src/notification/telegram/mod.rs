mod message_builder;
mod sender;

pub use message_builder::{escape_html, DEFAULT_TEMPLATE};

use reqwest::Client;
use std::time::Duration;

use crate::config::TelegramConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Telegram bot notification sender
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn build_send_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_send_url() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            enabled: true,
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            ..TelegramConfig::default()
        });
        assert_eq!(
            notifier.build_send_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_render_uses_configured_template() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            template: Some("{name}: {status} / {result}".to_string()),
            ..TelegramConfig::default()
        });
        assert_eq!(
            notifier.render("a&b", false, "<oops>"),
            "a&amp;b: <b>失败 ❌</b> / &lt;oops&gt;"
        );
    }

    #[test]
    fn test_render_default_template() {
        let notifier = TelegramNotifier::new(TelegramConfig::default());
        let text = notifier.render("alice", true, r#"{"success":true}"#);
        assert!(text.starts_with("<b>AnyRouter 签到系统</b>"));
        assert!(text.contains("<code>alice</code>"));
        assert!(text.contains("<b>成功 ✅</b>"));
        assert!(text.contains("<pre>{&#34;success&#34;:true}</pre>"));
    }
}
