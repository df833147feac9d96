//! Jobwatch Notification Layer
//!
//! Renders job records into channel messages and delivers them.
//!
//! # Architecture
//!
//! - `format`: pure renderers (detailed message, summary lines, pagination)
//! - `notifier`: batch delivery with per-send timeout and inter-message pacing
//! - `telegram`: Bot API implementation of `NotificationTransport`
//! - `mock`: deterministic transport for tests
//!
//! # Examples
//!
//! ```
//! use jobwatch_domain::JobRecord;
//! use jobwatch_notify::format::{format, FormatMode, FormatOptions};
//!
//! let mut job = JobRecord::new(0);
//! job.job_title = Some("Build a website".to_string());
//!
//! let payloads = format(&[job], FormatMode::GroupedSummary, &FormatOptions::default());
//! assert_eq!(payloads.len(), 1);
//! assert!(payloads[0].contains("1. <b>Build a website</b>"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod format;
pub mod mock;
pub mod notifier;
pub mod telegram;

pub use config::{
    DispatchMode, NotifyConfig, TelegramConfig, CHANNEL_CHAR_LIMIT, DEFAULT_API_BASE,
    DEFAULT_CHAR_BUDGET, MIN_CHAR_BUDGET,
};
pub use error::TransportError;
pub use format::{FormatMode, FormatOptions, Page};
pub use mock::{DeliveredMessage, MockTransport};
pub use notifier::{DispatchReport, FailedItem, Notifier, SendFailure};
pub use telegram::{BotIdentity, TelegramTransport};
