//! Logging setup.
//!
//! Every event goes to a daily-rolled file as one JSON object per line
//! (timestamp with offset and milliseconds, level, target, pid, thread,
//! source location, message, structured fields). Debug builds also print a
//! colored human-readable line to stdout. `log` records emitted by
//! dependencies are forwarded into `tracing`.

mod format;

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use format::{HumanFormatter, JsonLineFormatter};

pub const LOG_FILE_PREFIX: &str = "anycheckin.log";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOGGER_READY: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_logger(log_dir: PathBuf) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;
    let _ = LOG_DIR.set(log_dir.clone());

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
    let _ = FILE_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .event_format(JsonLineFormatter::new())
        .with_filter(file_filter());

    let stdout_layer = cfg!(debug_assertions).then(|| {
        fmt::layer()
            .with_ansi(true)
            .event_format(HumanFormatter::new())
            .with_filter(stdout_filter())
    });

    let subscriber = Registry::default().with(file_layer).with(stdout_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "anycheckin::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

fn file_filter() -> EnvFilter {
    let default_directives = if cfg!(debug_assertions) {
        "info,anycheckin=debug,anycheckin_app=debug,anycheckin_infrastructure=debug"
    } else {
        "info,sqlx=warn"
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stdout_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,anycheckin_app=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Directory passed to [`init_logger`], once initialized.
pub fn log_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}
