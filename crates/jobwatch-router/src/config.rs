//! Configuration file parsing for the service.
//!
//! Loads bind settings, the ledger path and the per-component sections
//! from one TOML file. Bot credentials may come from the environment.

use jobwatch_extractor::ExtractorConfig;
use jobwatch_notify::{NotifyConfig, TelegramConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `telegram.bot_token`
pub const ENV_TELEGRAM_TOKEN: &str = "JOBWATCH_TELEGRAM_TOKEN";

/// Environment variable overriding `telegram.chat_id`
pub const ENV_TELEGRAM_CHAT_ID: &str = "JOBWATCH_TELEGRAM_CHAT_ID";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A section failed validation
    #[error("Invalid [{section}] configuration: {reason}")]
    Invalid {
        /// Offending section
        section: &'static str,
        /// Validation message
        reason: String,
    },
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite ledger path
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Listing parser settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Formatting and delivery settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Bot API credentials
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Optional in-process page poller
    #[serde(default)]
    pub poller: Option<PollerConfig>,
}

/// Poll worker configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollerConfig {
    /// Page to fetch on every tick
    pub url: String,

    /// Seconds between fetches (default: 300)
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    /// Seconds allowed for one fetch (default: 30)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl PollerConfig {
    /// Tick interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url must not be empty".to_string());
        }
        if self.interval_secs == 0 {
            return Err("interval_secs must be greater than 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "jobwatch.db".to_string()
}

/// Default poll interval: 5 minutes
fn default_poll_interval() -> u64 {
    300
}

fn default_fetch_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());

        // Validate required fields
        if config.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingField("telegram.bot_token".to_string()));
        }
        if config.telegram.chat_id.is_empty() {
            return Err(ConfigError::MissingField("telegram.chat_id".to_string()));
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace credentials with values found by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN).filter(|v| !v.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup(ENV_TELEGRAM_CHAT_ID).filter(|v| !v.is_empty()) {
            self.telegram.chat_id = chat_id;
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor
            .validate()
            .map_err(|reason| ConfigError::Invalid { section: "extractor", reason })?;
        self.notify
            .validate()
            .map_err(|reason| ConfigError::Invalid { section: "notify", reason })?;
        if let Some(poller) = &self.poller {
            poller
                .validate()
                .map_err(|reason| ConfigError::Invalid { section: "poller", reason })?;
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        AppConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: ":memory:".to_string(),
            extractor: ExtractorConfig::default(),
            notify: NotifyConfig::default(),
            telegram: TelegramConfig {
                bot_token: "test-token-do-not-use-in-production".to_string(),
                chat_id: "0".to_string(),
                ..Default::default()
            },
            poller: None,
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobwatch_notify::DispatchMode;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 3000);
        assert_eq!(config.database_path, ":memory:");
        assert!(config.poller.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = AppConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/jobwatch/ledger.db"

            [notify]
            mode = "individual"
            char_budget = 3500

            [telegram]
            bot_token = "123:abc"
            chat_id = "-100"

            [poller]
            url = "https://www.upwork.com/nx/search/jobs/?q=rust"
            interval_secs = 600
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.database_path, "/var/lib/jobwatch/ledger.db");
        assert_eq!(config.notify.mode, DispatchMode::Individual);
        assert_eq!(config.notify.char_budget, 3500);
        assert_eq!(config.extractor, ExtractorConfig::default());
        assert_eq!(config.telegram.bot_token, "123:abc");

        let poller = config.poller.unwrap();
        assert_eq!(poller.interval(), Duration::from_secs(600));
        assert_eq!(poller.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_replace_credentials() {
        let mut config = AppConfig::default_test_config();
        config.apply_overrides(|key| match key {
            ENV_TELEGRAM_TOKEN => Some("from-env".to_string()),
            ENV_TELEGRAM_CHAT_ID => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.telegram.bot_token, "from-env");
        // Empty values do not clobber the file
        assert_eq!(config.telegram.chat_id, "0");
    }

    #[test]
    fn test_from_file_requires_credentials() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port = 4000").unwrap();

        // Only meaningful when the override variables are unset
        if std::env::var(ENV_TELEGRAM_TOKEN).is_err() {
            let result = AppConfig::from_file(file.path());
            assert!(matches!(result, Err(ConfigError::MissingField(_))));
        }
    }

    #[test]
    fn test_from_file_rejects_invalid_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[telegram]\nbot_token = \"t\"\nchat_id = \"1\"\n\n[notify]\nchar_budget = 10"
        )
        .unwrap();

        let result = AppConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid { section: "notify", .. })));
    }

    #[test]
    fn test_poller_validation() {
        let poller = PollerConfig {
            url: "http://localhost/jobs".to_string(),
            interval_secs: 0,
            fetch_timeout_secs: 30,
        };
        assert!(poller.validate().is_err());
    }
}
