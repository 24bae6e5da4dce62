//! Findings provider contract.

use crate::errors::StorageError;
use crate::types::Finding;

/// Source of collected findings per audit run.
///
/// The provider guarantees at most one finding per `(entity_type,
/// entity_key)` within a run, and that every `entity_key` went through
/// [`EntityKey`](crate::entity_key::EntityKey) normalization.
pub trait FindingsProvider {
    fn findings_for_run(&self, audit_run_id: i64) -> Result<Vec<Finding>, StorageError>;

    /// Whether a run with this id was recorded at all. Distinguishes "run
    /// produced no findings" from "run never happened".
    fn run_exists(&self, audit_run_id: i64) -> Result<bool, StorageError>;
}
