//! Jobwatch Domain Layer
//!
//! This crate contains the core data model for Jobwatch and the trait
//! interfaces that the infrastructure crates implement. It carries no I/O.
//!
//! ## Key Concepts
//!
//! - **JobRecord**: normalized representation of one scraped listing fragment
//! - **LedgerEntry**: a job identifier the system has already processed
//! - **NotificationTransport**: the outbound message-send boundary
//!
//! ## Architecture
//!
//! - Pure data types and trait definitions only
//! - Storage lives in `jobwatch-store`, transports in `jobwatch-notify`
//! - Extraction and formatting are pure functions over these types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod job;
pub mod ledger;
pub mod message;
pub mod traits;

// Re-exports for convenience
pub use job::{FreelancersToHire, JobRecord};
pub use ledger::LedgerEntry;
pub use message::{MessageId, ParseMode, SendOptions};
