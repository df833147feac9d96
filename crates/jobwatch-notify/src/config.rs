//! Configuration for notification formatting and delivery

use jobwatch_domain::ParseMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard per-message character limit of the channel
pub const CHANNEL_CHAR_LIMIT: usize = 4096;

/// Default budget, leaving headroom under the channel limit
pub const DEFAULT_CHAR_BUDGET: usize = 4000;

/// Smallest budget the formatter accepts (room for a header plus one line)
pub const MIN_CHAR_BUDGET: usize = 200;

/// Default Bot API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// How a batch of new jobs is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One summary message, paginated when over budget
    #[default]
    Grouped,
    /// One detailed message per job, spaced by the inter-message delay
    Individual,
}

/// Configuration for the Notifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Delivery mode for batches
    pub mode: DispatchMode,

    /// Maximum characters per message
    pub char_budget: usize,

    /// Pause between consecutive messages (milliseconds)
    pub inter_message_delay_ms: u64,

    /// Maximum time for a single send (seconds)
    pub send_timeout_secs: u64,

    /// Deliver without notification sound
    pub silent: bool,

    /// Markup dialect of the rendered messages; only HTML is rendered
    pub parse_mode: ParseMode,

    /// Base URL that relative listing links are resolved against
    pub link_base: Option<String>,
}

impl NotifyConfig {
    /// Pause between messages as a Duration
    pub fn inter_message_delay(&self) -> Duration {
        Duration::from_millis(self.inter_message_delay_ms)
    }

    /// Send timeout as a Duration
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.char_budget < MIN_CHAR_BUDGET {
            return Err(format!("char_budget must be at least {}", MIN_CHAR_BUDGET));
        }
        if self.char_budget > CHANNEL_CHAR_LIMIT {
            return Err(format!("char_budget cannot exceed {}", CHANNEL_CHAR_LIMIT));
        }
        if self.send_timeout_secs == 0 {
            return Err("send_timeout_secs must be greater than 0".to_string());
        }
        if self.parse_mode != ParseMode::Html {
            return Err(format!(
                "parse_mode {} is not supported, messages are rendered as HTML",
                self.parse_mode.as_str()
            ));
        }
        if let Some(base) = &self.link_base {
            url::Url::parse(base).map_err(|e| format!("link_base is not a valid URL: {}", e))?;
        }
        Ok(())
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Grouped,
            char_budget: DEFAULT_CHAR_BUDGET,
            inter_message_delay_ms: 1000,
            send_timeout_secs: 10,
            silent: false,
            parse_mode: ParseMode::Html,
            link_base: Some("https://www.upwork.com".to_string()),
        }
    }
}

/// Bot API credentials and endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// API endpoint (overridable for tests and proxies)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bot token
    #[serde(default)]
    pub bot_token: String,

    /// Target chat identifier
    #[serde(default)]
    pub chat_id: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl TelegramConfig {
    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NotifyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.char_budget, 4000);
        assert_eq!(config.inter_message_delay(), Duration::from_millis(1000));
        assert_eq!(config.send_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_budget_bounds() {
        let mut config = NotifyConfig::default();
        config.char_budget = CHANNEL_CHAR_LIMIT + 1;
        assert!(config.validate().is_err());

        config.char_budget = MIN_CHAR_BUDGET - 1;
        assert!(config.validate().is_err());

        config.char_budget = CHANNEL_CHAR_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_link_base() {
        let config = NotifyConfig {
            link_base: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_markdown_parse_mode_rejected() {
        let config: NotifyConfig = toml::from_str(r#"parse_mode = "Markdown""#).unwrap();
        assert_eq!(config.parse_mode, ParseMode::Markdown);

        let err = config.validate().unwrap_err();
        assert!(err.contains("parse_mode"));
    }

    #[test]
    fn test_parse_toml() {
        let config: NotifyConfig = toml::from_str(
            r#"
            mode = "individual"
            inter_message_delay_ms = 250
            silent = true
            parse_mode = "HTML"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, DispatchMode::Individual);
        assert_eq!(config.inter_message_delay_ms, 250);
        assert!(config.silent);
        assert_eq!(config.char_budget, DEFAULT_CHAR_BUDGET);
    }

    #[test]
    fn test_telegram_configured() {
        let mut telegram = TelegramConfig::default();
        assert!(!telegram.is_configured());
        assert_eq!(telegram.api_base, DEFAULT_API_BASE);

        telegram.bot_token = "123:abc".to_string();
        telegram.chat_id = "-100".to_string();
        assert!(telegram.is_configured());
    }
}
