//! Action-log entries — the append-only audit trail of logged transitions.

use serde::{Deserialize, Serialize};

use crate::entity_key::EntityKey;

use super::transition::{ActionStatus, ChangeType};

/// One row destined for the action log.
///
/// `(entity_key, change_type, audit_run_id)` is the idempotency key: the
/// sink must silently drop a second append with the same triple, which is
/// what makes accidental double-invocation of a sync cycle harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEntry {
    pub entity_key: EntityKey,
    pub change_type: ChangeType,
    pub action_status: ActionStatus,
    pub notes: Option<String>,
    /// Epoch seconds. Parsed leniently at the boundary; a malformed date
    /// becomes `None`, never an error.
    pub action_date: Option<i64>,
    pub audit_run_id: i64,
}
