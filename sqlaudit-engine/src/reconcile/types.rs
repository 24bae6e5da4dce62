//! Sync request/summary types.

use serde::Serialize;

use sqlaudit_core::entity_key::EntityKey;
use sqlaudit_core::traits::AnnotationMap;
use sqlaudit_core::types::ChangeType;

/// Input to one reconciliation cycle.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// The just-completed audit run.
    pub audit_run_id: i64,
    /// The reference run to diff against. May equal `audit_run_id` on the
    /// first sync.
    pub baseline_run_id: i64,
    /// Freshly read user edits from the workbook, keyed by normalized
    /// entity key. Absence of a key that had annotations before means the
    /// user cleared the row.
    pub annotations: AnnotationMap,
    /// Instances that failed to respond during collection. Entities whose
    /// baseline finding lives on one of these must not be classified as
    /// fixed just because they are missing from the new run.
    pub unscanned_instances: Vec<String>,
    /// Cycle timestamp override (epoch seconds), used as the history
    /// cutoff and the action date. Defaults to now.
    pub sync_time: Option<i64>,
}

impl SyncRequest {
    pub fn new(audit_run_id: i64, baseline_run_id: i64, annotations: AnnotationMap) -> Self {
        Self {
            audit_run_id,
            baseline_run_id,
            annotations,
            unscanned_instances: Vec::new(),
            sync_time: None,
        }
    }
}

/// Per-change-type tallies for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub no_change: usize,
    pub fixed: usize,
    pub regression: usize,
    pub new_issue: usize,
    pub exception_added: usize,
    pub exception_removed: usize,
    pub exception_updated: usize,
    pub still_failing: usize,
    pub unknown: usize,
}

impl ChangeCounts {
    pub fn record(&mut self, change_type: ChangeType) {
        *self.slot(change_type) += 1;
    }

    pub fn get(&self, change_type: ChangeType) -> usize {
        match change_type {
            ChangeType::NoChange => self.no_change,
            ChangeType::Fixed => self.fixed,
            ChangeType::Regression => self.regression,
            ChangeType::NewIssue => self.new_issue,
            ChangeType::ExceptionAdded => self.exception_added,
            ChangeType::ExceptionRemoved => self.exception_removed,
            ChangeType::ExceptionUpdated => self.exception_updated,
            ChangeType::StillFailing => self.still_failing,
            ChangeType::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, change_type: ChangeType) -> &mut usize {
        match change_type {
            ChangeType::NoChange => &mut self.no_change,
            ChangeType::Fixed => &mut self.fixed,
            ChangeType::Regression => &mut self.regression,
            ChangeType::NewIssue => &mut self.new_issue,
            ChangeType::ExceptionAdded => &mut self.exception_added,
            ChangeType::ExceptionRemoved => &mut self.exception_removed,
            ChangeType::ExceptionUpdated => &mut self.exception_updated,
            ChangeType::StillFailing => &mut self.still_failing,
            ChangeType::Unknown => &mut self.unknown,
        }
    }
}

/// An entity whose processing failed mid-cycle. The cycle continues; the
/// entity is surfaced here for investigation.
#[derive(Debug, Clone, Serialize)]
pub struct EntityError {
    pub entity_key: EntityKey,
    pub message: String,
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub audit_run_id: i64,
    pub baseline_run_id: i64,
    pub entities_processed: usize,
    pub counts: ChangeCounts,
    /// Action-log rows actually written this cycle (idempotency-key
    /// duplicates excluded).
    pub actions_logged: usize,
    /// Invalid `Exception` statuses blanked on passing rows.
    pub auto_cleared: usize,
    pub errored_entities: Vec<EntityError>,
    pub duration_ms: u64,
}

impl SyncSummary {
    /// Render the summary as pretty JSON for operator-facing output.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
