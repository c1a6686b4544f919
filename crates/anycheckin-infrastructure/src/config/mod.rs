//! Application configuration loaded from a TOML file.
//!
//! String values written as `${VAR:default}` are resolved from the
//! environment when the file is loaded.

mod env;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use env::expand_env;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ANYCHECKIN_CONFIG";

pub const DEFAULT_SITE_URL: &str = "https://anyrouter.top";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub site: SiteConfig,
    pub scheduler: SchedulerConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join("anycheckin.db"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// 32-byte AES key, or a passphrase the key is derived from.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Optional HTTP(S)/SOCKS5 proxy URL
    pub proxy: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            proxy: None,
        }
    }
}

impl SiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Offset cron expressions are evaluated in, e.g. `+08:00`.
    /// Defaults to the host's current local offset.
    pub utc_offset: Option<String>,
    pub max_concurrent_runs: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            utc_offset: None,
            max_concurrent_runs: 4,
        }
    }
}

impl SchedulerConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        match self.utc_offset.as_deref().map(str::trim) {
            None | Some("") => Ok(*chrono::Local::now().offset()),
            Some(raw) => raw.parse::<FixedOffset>().map_err(|e| ConfigError::Invalid {
                key: "scheduler.utc_offset",
                reason: format!("'{}': {}", raw, e),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    /// Message template; `{name}`, `{status}` and `{result}` are replaced.
    pub template: Option<String>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            chat_id: String::new(),
            template: None,
            api_base: DEFAULT_TELEGRAM_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: data_dir().join("logs"),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anycheckin")
}

impl AppConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads from `$ANYCHECKIN_CONFIG`, falling back to `./anycheckin.toml`.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("anycheckin.toml"));
        Self::load(&path)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        let mut config: AppConfig = toml::from_str(raw)?;
        config.expand_env();
        Ok(config)
    }

    fn expand_env(&mut self) {
        self.security.secret = expand_env(&self.security.secret);
        self.site.base_url = expand_env(&self.site.base_url);
        self.site.proxy = self.site.proxy.as_deref().map(expand_env);
        self.telegram.bot_token = expand_env(&self.telegram.bot_token);
        self.telegram.chat_id = expand_env(&self.telegram.chat_id);
        self.database.path = PathBuf::from(expand_env(&self.database.path.to_string_lossy()));
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret.is_empty() {
            return Err(ConfigError::Invalid {
                key: "security.secret",
                reason: "must be set".to_string(),
            });
        }
        if self.scheduler.max_concurrent_runs == 0 {
            return Err(ConfigError::Invalid {
                key: "scheduler.max_concurrent_runs",
                reason: "must be at least 1".to_string(),
            });
        }
        url::Url::parse(&self.site.base_url).map_err(|e| ConfigError::Invalid {
            key: "site.base_url",
            reason: e.to_string(),
        })?;
        self.scheduler.offset()?;
        Ok(())
    }
}
