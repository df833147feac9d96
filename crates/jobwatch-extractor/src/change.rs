//! Change Detector: whole-payload fingerprint comparison
//!
//! The fingerprint is the canonical JSON form of the payload (object keys
//! sorted at every depth). Any difference anywhere flips the result for the
//! whole batch; per-record dedup is the ledger's job.

use crate::error::ExtractorError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Remembers the fingerprint of the last payload that was reported as changed
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_fingerprint: Option<String>,
}

impl ChangeDetector {
    /// Create a detector with no memo; the first payload always counts as changed
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `payload` differs from the last remembered one
    ///
    /// On `true` the memo is replaced by this payload's fingerprint.
    pub fn has_changed<T: Serialize + ?Sized>(&mut self, payload: &T) -> Result<bool, ExtractorError> {
        let fingerprint = fingerprint(payload)?;

        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!("Payload unchanged ({} byte fingerprint)", fingerprint.len());
            return Ok(false);
        }

        self.last_fingerprint = Some(fingerprint);
        Ok(true)
    }

    /// Forget the remembered payload
    pub fn reset(&mut self) {
        self.last_fingerprint = None;
    }
}

/// Canonical serialized form of `payload`
pub fn fingerprint<T: Serialize + ?Sized>(payload: &T) -> Result<String, ExtractorError> {
    let value = serde_json::to_value(payload)?;
    Ok(canonicalize(value).to_string())
}

/// Rebuild objects with keys inserted in sorted order
///
/// Holds even if `serde_json/preserve_order` is enabled somewhere in the graph.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
