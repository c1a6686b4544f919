use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// One JSON object per event.
pub(super) struct JsonLineFormatter {
    pid: u32,
}

impl JsonLineFormatter {
    pub(super) fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let thread = std::thread::current();

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);
        let message = visitor.fields.remove("message").unwrap_or(Value::Null);

        let mut line = json!({
            "timestamp": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            "level": metadata.level().to_string(),
            "target": metadata.target(),
            "pid": self.pid,
            "tid": format!("{:?}", thread.id()),
            "thread_name": thread.name().unwrap_or("unnamed"),
            "message": message,
            "version": env!("CARGO_PKG_VERSION"),
        });
        if let Some(file) = metadata.file() {
            line["file"] = json!(file);
        }
        if let Some(number) = metadata.line() {
            line["line"] = json!(number);
        }
        if !visitor.fields.is_empty() {
            line["fields"] = Value::Object(visitor.fields);
        }

        writeln!(writer, "{}", line)
    }
}

/// `2025-01-01 08:00:00.123 [INFO] (target) key=value: message (file:line)`
pub(super) struct HumanFormatter {
    pid: u32,
}

impl HumanFormatter {
    pub(super) fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for HumanFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);
        let message = match visitor.fields.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let mut fields = String::new();
        for (key, value) in &visitor.fields {
            let _ = write!(fields, " {}={}", key, value);
        }

        let location = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        writeln!(
            writer,
            "{} [{}] ({}) pid={}{}: {}{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            colored_level(metadata.level(), writer.has_ansi_escapes()),
            metadata.target(),
            self.pid,
            fields,
            message,
            location
        )
    }
}

fn colored_level(level: &Level, ansi: bool) -> String {
    if !ansi {
        return level.to_string();
    }
    let color = match *level {
        Level::ERROR => 31,
        Level::WARN => 33,
        Level::INFO => 32,
        Level::DEBUG => 36,
        Level::TRACE => 35,
    };
    format!("\x1b[{}m{}\x1b[0m", color, level)
}

#[derive(Default)]
struct FieldCollector {
    fields: Map<String, Value>,
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), json!(format!("{:?}", value)));
    }
}
