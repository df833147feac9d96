//! Dedup ledger entries

/// A job identifier recorded as processed
///
/// Entries are created once per distinct identifier and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Autogenerated row id
    pub id: i64,

    /// Opaque job identifier (exact-match semantics)
    pub job_id: String,

    /// When the identifier was first recorded
    pub created_at: String,
}
