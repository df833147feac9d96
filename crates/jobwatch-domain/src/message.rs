//! Outbound message options

use serde::{Deserialize, Serialize};

/// Identifier the channel assigns to a delivered message
pub type MessageId = i64;

/// Markup dialect the channel should interpret the text with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// HTML subset (`<b>`, `<code>`, `<a>`, `<blockquote>`)
    #[default]
    #[serde(rename = "HTML")]
    Html,
    /// Legacy Markdown
    Markdown,
}

impl ParseMode {
    /// Wire name expected by the Bot API
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Per-message delivery options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOptions {
    /// Markup dialect
    pub parse_mode: ParseMode,

    /// Do not render link previews
    pub suppress_link_preview: bool,

    /// Deliver without a notification sound
    pub silent: bool,
}
