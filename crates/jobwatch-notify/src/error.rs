//! Error types for notification delivery

use thiserror::Error;

/// Errors that can occur while delivering a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Network or HTTP communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The channel rejected the request
    #[error("API error (HTTP {status}): {description}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Channel-provided description
        description: String,
    },

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport cannot be built from the given settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No response within the send timeout
    #[error("Send timeout")]
    Timeout,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return TransportError::Timeout;
        }
        // The request URL carries the bot token; keep it out of the message
        TransportError::Communication(e.without_url().to_string())
    }
}
