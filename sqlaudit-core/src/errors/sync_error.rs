//! Reconciliation/sync errors.

use super::error_code::{self, AuditErrorCode};
use super::storage_error::StorageError;

/// Errors that abort a whole sync cycle. Per-entity failures are NOT
/// errors at this level; the engine collects them in the cycle summary
/// and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Baseline run {run_id} not found")]
    BaselineMissing { run_id: i64 },
}

impl AuditErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        error_code::SYNC_ERROR
    }
}
