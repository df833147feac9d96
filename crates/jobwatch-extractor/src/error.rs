//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A configured CSS selector failed to compile
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector source text
        selector: String,
        /// Parser message
        reason: String,
    },

    /// Document exceeds maximum accepted size
    #[error("Document too large: {0} bytes (max: {1})")]
    DocumentTooLarge(usize, usize),

    /// Payload could not be serialized into a fingerprint
    #[error("Fingerprint error: {0}")]
    Fingerprint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Fingerprint(e.to_string())
    }
}
