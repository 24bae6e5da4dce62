//! Annotation diffing — eligibility transitions between two annotation
//! snapshots, evaluated against finding status on both sides.

use rustc_hash::FxHashMap;

use sqlaudit_core::entity_key::EntityKey;
use sqlaudit_core::traits::AnnotationMap;
use sqlaudit_core::types::{AnnotationFields, Finding, FindingStatus};

use super::eligibility::is_exception_eligible;

/// Kind of eligibility transition detected for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionChangeKind {
    Added,
    Removed,
    Updated,
}

impl ExceptionChangeKind {
    /// The change type this detection contributes to resolution.
    pub fn change_type(self) -> sqlaudit_core::types::ChangeType {
        use sqlaudit_core::types::ChangeType;
        match self {
            Self::Added => ChangeType::ExceptionAdded,
            Self::Removed => ChangeType::ExceptionRemoved,
            Self::Updated => ChangeType::ExceptionUpdated,
        }
    }
}

/// One detected exception change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionChange {
    pub kind: ExceptionChangeKind,
    pub entity_key: EntityKey,
}

/// Diff two annotation snapshots against the current findings.
///
/// For each finding whose key appears in `new_annotations` or only in
/// `old_annotations`:
/// - `old_eligible` is computed against the baseline status for that key
///   (`baseline_status`; a key without a prior observation is never
///   eligible),
/// - `new_eligible` against the finding's current status.
///
/// Emits `Added`/`Removed` on eligibility flips and `Updated` when both
/// sides are eligible but the justification text differs. Identical
/// inputs produce an empty list; idempotence is the core contract here.
/// Output is sorted by entity key for determinism.
pub fn detect_exception_changes(
    old_annotations: &AnnotationMap,
    new_annotations: &AnnotationMap,
    current_findings: &[Finding],
    baseline_status: &FxHashMap<EntityKey, FindingStatus>,
) -> Vec<ExceptionChange> {
    static EMPTY: AnnotationFields = AnnotationFields {
        justification: None,
        review_status: None,
        notes: None,
    };

    let mut changes = Vec::new();

    for finding in current_findings {
        let key = &finding.entity_key;
        let old = old_annotations.get(key);
        let new = new_annotations.get(key);
        if new.is_none() && old.is_none() {
            continue;
        }
        let old = old.unwrap_or(&EMPTY);
        let new = new.unwrap_or(&EMPTY);

        // An unchanged annotation is never an annotation-side signal, no
        // matter what the finding status did; status-driven transitions
        // are the state machine's concern. This is what makes a re-run
        // with identical annotations yield an empty list.
        if old == new {
            continue;
        }

        let old_eligible = is_exception_eligible(
            baseline_status.get(key).copied(),
            old.has_justification(),
            old.review_status.as_deref(),
        );
        let new_eligible = is_exception_eligible(
            finding.status,
            new.has_justification(),
            new.review_status.as_deref(),
        );

        let kind = match (old_eligible, new_eligible) {
            (false, true) => Some(ExceptionChangeKind::Added),
            (true, false) => Some(ExceptionChangeKind::Removed),
            (true, true) if justification_differs(old, new) => Some(ExceptionChangeKind::Updated),
            _ => None,
        };

        if let Some(kind) = kind {
            changes.push(ExceptionChange {
                kind,
                entity_key: key.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.entity_key.cmp(&b.entity_key));
    changes
}

fn justification_differs(old: &AnnotationFields, new: &AnnotationFields) -> bool {
    let old_text = old.justification.as_deref().map(str::trim).unwrap_or("");
    let new_text = new.justification.as_deref().map(str::trim).unwrap_or("");
    old_text != new_text
}
