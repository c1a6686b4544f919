mod telegram;

pub use telegram::{escape_html, TelegramNotifier, DEFAULT_TEMPLATE};
