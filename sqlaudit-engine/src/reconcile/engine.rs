//! The sync engine — orchestrates one full reconciliation cycle.

use std::collections::BTreeSet;
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use sqlaudit_core::entity_key::EntityKey;
use sqlaudit_core::errors::{StorageError, SyncError};
use sqlaudit_core::timeparse::now_epoch;
use sqlaudit_core::traits::{ActionSink, AnnotationsProvider, FindingsProvider};
use sqlaudit_core::types::{
    ActionEntry, AnnotationFields, ChangeType, Finding, FindingStatus, TransitionResult,
    FIELD_REVIEW_STATUS,
};

use super::diff::{detect_exception_changes, ExceptionChangeKind};
use super::eligibility::{is_exception_eligible, should_clear_exception_status};
use super::resolution::resolve_concurrent_changes;
use super::state_machine::classify_finding_transition;
use super::types::{EntityError, SyncRequest, SyncSummary};

/// Orchestrates reconciliation cycles against any store implementing the
/// provider traits.
pub struct SyncEngine<'a, S>
where
    S: FindingsProvider + AnnotationsProvider + ActionSink,
{
    store: &'a S,
    modified_by: String,
}

/// What happened to one entity during the cycle.
struct EntityOutcome {
    result: TransitionResult,
    logged: bool,
    auto_cleared: bool,
}

impl<'a, S> SyncEngine<'a, S>
where
    S: FindingsProvider + AnnotationsProvider + ActionSink,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            modified_by: "sync-engine".to_string(),
        }
    }

    /// Author recorded on engine-side annotation writes.
    pub fn with_modified_by(mut self, name: impl Into<String>) -> Self {
        self.modified_by = name.into();
        self
    }

    /// Run one full reconciliation cycle.
    ///
    /// Loads the baseline (history-derived annotations plus the baseline
    /// run's findings), classifies every entity seen in either run or in
    /// the annotation delta, resolves concurrent signals, persists
    /// annotation imports and auto-clears, and appends idempotent
    /// action-log entries. A single entity's failure is recorded and
    /// skipped; the cycle continues.
    pub fn run_sync(&self, request: &SyncRequest) -> Result<SyncSummary, SyncError> {
        let start = Instant::now();
        let sync_time = request.sync_time.unwrap_or_else(now_epoch);

        if !self.store.run_exists(request.baseline_run_id)? {
            return Err(SyncError::BaselineMissing {
                run_id: request.baseline_run_id,
            });
        }

        let old_annotations = self.store.annotations_as_of(sync_time)?;
        let old_list = self.store.findings_for_run(request.baseline_run_id)?;
        let new_list = self.store.findings_for_run(request.audit_run_id)?;

        let old_by_key: FxHashMap<&EntityKey, &Finding> =
            old_list.iter().map(|f| (&f.entity_key, f)).collect();
        let new_by_key: FxHashMap<&EntityKey, &Finding> =
            new_list.iter().map(|f| (&f.entity_key, f)).collect();
        let baseline_status: FxHashMap<EntityKey, FindingStatus> = old_list
            .iter()
            .filter_map(|f| f.status.map(|s| (f.entity_key.clone(), s)))
            .collect();

        let exception_changes = detect_exception_changes(
            &old_annotations,
            &request.annotations,
            &new_list,
            &baseline_status,
        );
        let exception_by_key: FxHashMap<&EntityKey, ExceptionChangeKind> = exception_changes
            .iter()
            .map(|c| (&c.entity_key, c.kind))
            .collect();

        let unscanned: FxHashSet<&str> = request
            .unscanned_instances
            .iter()
            .map(String::as_str)
            .collect();

        // Deterministic processing order over the full key universe.
        let mut all_keys: BTreeSet<&EntityKey> = BTreeSet::new();
        all_keys.extend(new_by_key.keys().copied());
        all_keys.extend(old_by_key.keys().copied());
        all_keys.extend(request.annotations.keys());
        all_keys.extend(old_annotations.keys());

        let mut summary = SyncSummary {
            audit_run_id: request.audit_run_id,
            baseline_run_id: request.baseline_run_id,
            entities_processed: all_keys.len(),
            ..Default::default()
        };

        let empty = AnnotationFields::default();
        for key in all_keys {
            let old_finding = old_by_key.get(key).copied();
            let new_finding = new_by_key.get(key).copied();
            let instance_was_scanned = match new_finding {
                Some(_) => true,
                None => old_finding.map_or(true, |f| !unscanned.contains(f.instance_id.as_str())),
            };

            let outcome = self.process_entity(
                key,
                old_finding,
                new_finding,
                old_annotations.get(key).unwrap_or(&empty),
                request.annotations.get(key).unwrap_or(&empty),
                request.annotations.contains_key(key),
                old_annotations.contains_key(key),
                exception_by_key.get(key).copied(),
                instance_was_scanned,
                sync_time,
                request.audit_run_id,
            );

            match outcome {
                Ok(outcome) => {
                    summary.counts.record(outcome.result.change_type);
                    if outcome.logged {
                        summary.actions_logged += 1;
                    }
                    if outcome.auto_cleared {
                        summary.auto_cleared += 1;
                    }
                }
                Err(e) => {
                    warn!(entity_key = %key, error = %e, "entity processing failed, continuing");
                    summary.errored_entities.push(EntityError {
                        entity_key: key.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            audit_run_id = summary.audit_run_id,
            baseline_run_id = summary.baseline_run_id,
            entities = summary.entities_processed,
            actions_logged = summary.actions_logged,
            auto_cleared = summary.auto_cleared,
            errors = summary.errored_entities.len(),
            "sync cycle complete"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_entity(
        &self,
        key: &EntityKey,
        old_finding: Option<&Finding>,
        new_finding: Option<&Finding>,
        old_fields: &AnnotationFields,
        new_fields: &AnnotationFields,
        has_new_annotations: bool,
        had_old_annotations: bool,
        exception_signal: Option<ExceptionChangeKind>,
        instance_was_scanned: bool,
        sync_time: i64,
        audit_run_id: i64,
    ) -> Result<EntityOutcome, StorageError> {
        let old_status = old_finding.and_then(|f| f.status);
        let new_status = new_finding.and_then(|f| f.status);

        let old_has_exception = is_exception_eligible(
            old_status,
            old_fields.has_justification(),
            old_fields.review_status.as_deref(),
        );
        let new_has_exception = is_exception_eligible(
            new_status,
            new_fields.has_justification(),
            new_fields.review_status.as_deref(),
        );

        let status_result = classify_finding_transition(
            old_status,
            new_status,
            old_has_exception,
            new_has_exception,
            instance_was_scanned,
        );

        let mut signals = vec![status_result];
        if let Some(kind) = exception_signal {
            signals.push(TransitionResult::from_change(kind.change_type()));
        }
        let resolved = resolve_concurrent_changes(&signals);
        debug!(
            entity_key = %key,
            change_type = %resolved.change_type,
            should_log = resolved.should_log,
            "classified transition"
        );

        // Data hygiene: blank an Exception dropdown sitting on a passing
        // row. Silent: no EXCEPTION_REMOVED entry, it was never valid.
        let clear_review_status =
            should_clear_exception_status(new_status, new_fields.review_status.as_deref());
        let mut auto_cleared = false;
        if clear_review_status {
            auto_cleared = self.store.persist_annotation(
                key,
                FIELD_REVIEW_STATUS,
                "",
                &self.modified_by,
                sync_time,
                Some(audit_run_id),
            )?;
        }

        // Import the workbook state for this entity. A key that vanished
        // from the workbook while its finding is still current means the
        // user cleared the row; fields empty out, rows remain.
        if has_new_annotations || (had_old_annotations && new_finding.is_some()) {
            for (field, value) in new_fields.entries() {
                if clear_review_status && field == FIELD_REVIEW_STATUS {
                    continue;
                }
                self.store.persist_annotation(
                    key,
                    field,
                    value.unwrap_or(""),
                    &self.modified_by,
                    sync_time,
                    Some(audit_run_id),
                )?;
            }
        }

        let mut logged = false;
        if resolved.should_log {
            let notes = match resolved.change_type {
                ChangeType::ExceptionAdded | ChangeType::ExceptionUpdated => {
                    new_fields.justification.clone()
                }
                _ => new_finding
                    .map(|f| f.description.clone())
                    .filter(|d| !d.is_empty()),
            };
            let entry = ActionEntry {
                entity_key: key.clone(),
                change_type: resolved.change_type,
                action_status: resolved.action_status,
                notes,
                action_date: Some(sync_time),
                audit_run_id,
            };
            logged = self.store.append(&entry)?;
        }

        Ok(EntityOutcome {
            result: resolved,
            logged,
            auto_cleared,
        })
    }
}
