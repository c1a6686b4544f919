use serde_json::json;

/// Check-in card; `{name}`, `{status}` and `{result}` are substituted.
pub const DEFAULT_TEMPLATE: &str = "<b>AnyRouter 签到系统</b>
你好，<code>{name}</code>
状态：{status}
结果：
<pre>{result}</pre>";

const STATUS_SUCCESS: &str = "<b>成功 ✅</b>";
const STATUS_FAILURE: &str = "<b>失败 ❌</b>";

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl super::TelegramNotifier {
    pub(super) fn render(&self, name: &str, success: bool, result: &str) -> String {
        let template = self
            .config
            .template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TEMPLATE);
        let status = if success { STATUS_SUCCESS } else { STATUS_FAILURE };

        // Values are substituted in one pass so text inside `name` that looks
        // like a placeholder is left alone.
        let mut out = String::with_capacity(template.len() + result.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let (value, consumed) = if tail.starts_with("{name}") {
                (escape_html(name), "{name}".len())
            } else if tail.starts_with("{status}") {
                (status.to_string(), "{status}".len())
            } else if tail.starts_with("{result}") {
                (escape_html(result), "{result}".len())
            } else {
                ("{".to_string(), 1)
            };
            out.push_str(&value);
            rest = &tail[consumed..];
        }
        out.push_str(rest);
        out
    }

    pub(super) fn build_payload(&self, text: &str) -> serde_json::Value {
        json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
        })
    }
}
