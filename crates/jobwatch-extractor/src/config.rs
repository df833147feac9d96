//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Selector matching one listing fragment on the source page
pub const DEFAULT_LISTING_SELECTOR: &str = "section";

/// Largest document the parser accepts (matches the inbound body limit)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for the listing parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// CSS selector locating listing fragments
    pub listing_selector: String,

    /// Maximum input document size (bytes)
    pub max_document_bytes: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listing_selector.trim().is_empty() {
            return Err("listing_selector must not be empty".to_string());
        }
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            listing_selector: DEFAULT_LISTING_SELECTOR.to_string(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}
