//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{LedgerEntry, MessageId, SendOptions};
use async_trait::async_trait;

/// Trait for the persistent record of processed job identifiers
///
/// Implemented by the infrastructure layer (jobwatch-store)
pub trait JobLedger {
    /// Error type for ledger operations
    type Error;

    /// Record a job identifier, returning the new row id
    ///
    /// Recording an identifier twice must fail with a structured error
    /// rather than panic.
    fn record_job(&mut self, job_id: &str) -> Result<i64, Self::Error>;

    /// Look up a previously recorded job identifier
    fn find_job(&self, job_id: &str) -> Result<Option<LedgerEntry>, Self::Error>;

    /// Whether the identifier has already been processed
    fn has_seen(&self, job_id: &str) -> Result<bool, Self::Error> {
        Ok(self.find_job(job_id)?.is_some())
    }

    /// Mark the identifier as processed
    fn mark_seen(&mut self, job_id: &str) -> Result<i64, Self::Error> {
        self.record_job(job_id)
    }
}

/// Trait for the outbound notification channel
///
/// Implemented by the infrastructure layer (jobwatch-notify)
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Error type for send operations
    type Error: std::fmt::Display + Send;

    /// Deliver one pre-chunked text payload
    async fn send(&self, text: &str, options: &SendOptions) -> Result<MessageId, Self::Error>;
}
