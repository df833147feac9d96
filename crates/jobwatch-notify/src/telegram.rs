//! Telegram Bot API transport
//!
//! Sends rendered messages with `sendMessage`. Every call is a single HTTP
//! attempt; the caller decides what a failure means for the rest of a batch.
//!
//! # Examples
//!
//! ```no_run
//! use jobwatch_notify::{TelegramConfig, TelegramTransport};
//! use std::time::Duration;
//!
//! let config = TelegramConfig {
//!     bot_token: "123456:token".to_string(),
//!     chat_id: "-100200300".to_string(),
//!     ..Default::default()
//! };
//! let transport = TelegramTransport::new(&config, Duration::from_secs(10)).unwrap();
//! ```

use crate::config::TelegramConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use jobwatch_domain::traits::NotificationTransport;
use jobwatch_domain::{MessageId, SendOptions};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Envelope every Bot API method answers with
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Identity of the bot, as returned by `getMe`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotIdentity {
    /// Numeric bot id
    pub id: i64,
    /// Always true for bot accounts
    pub is_bot: bool,
    /// Display name
    pub first_name: String,
    /// Handle without the leading `@`
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    disable_notification: bool,
}

/// Bot API client bound to one chat
pub struct TelegramTransport {
    client: reqwest::Client,
    method_base: String,
    chat_id: String,
}

impl TelegramTransport {
    /// Build a transport; `timeout` bounds each HTTP request
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, TransportError> {
        if !config.is_configured() {
            return Err(TransportError::Configuration(
                "bot_token and chat_id are required".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            method_base: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Target chat
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    async fn call<P, R>(&self, method: &str, payload: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.method_base, method);
        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();

        let body: ApiResponse<R> = response.json().await.map_err(|e| {
            TransportError::InvalidResponse(format!(
                "{} (HTTP {}): {}",
                method,
                status.as_u16(),
                e.without_url()
            ))
        })?;

        if !body.ok || !status.is_success() {
            return Err(TransportError::Api {
                status: status.as_u16(),
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        body.result
            .ok_or_else(|| TransportError::InvalidResponse(format!("{} returned no result", method)))
    }

    /// Verify the token against the API (`getMe`)
    pub async fn check_connection(&self) -> Result<BotIdentity, TransportError> {
        let identity: BotIdentity = self.call("getMe", &serde_json::json!({})).await?;
        debug!(bot = ?identity.username, "Bot API reachable");
        Ok(identity)
    }
}

impl fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationTransport for TelegramTransport {
    type Error = TransportError;

    async fn send(&self, text: &str, options: &SendOptions) -> Result<MessageId, TransportError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: options.parse_mode.as_str(),
            disable_web_page_preview: options.suppress_link_preview,
            disable_notification: options.silent,
        };

        let sent: SentMessage = self.call("sendMessage", &request).await?;
        debug!(message_id = sent.message_id, units = crate::format::wire_len(text), "Message delivered");
        Ok(sent.message_id)
    }
}
