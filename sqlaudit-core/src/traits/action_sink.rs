//! Action-log sink contract.

use crate::errors::StorageError;
use crate::types::ActionEntry;

/// Append-only sink for loggable transitions.
pub trait ActionSink {
    /// Append an entry. Returns `false` when the idempotency key
    /// `(entity_key, change_type, audit_run_id)` already exists and the
    /// entry was dropped.
    fn append(&self, entry: &ActionEntry) -> Result<bool, StorageError>;
}
