//! Annotations provider contract.

use rustc_hash::FxHashMap;

use crate::entity_key::EntityKey;
use crate::errors::StorageError;
use crate::types::AnnotationFields;

/// Normalized-key → annotation-fields map, as read from one source.
pub type AnnotationMap = FxHashMap<EntityKey, AnnotationFields>;

/// Source and sink of annotation state, current and historical.
///
/// Keys on all methods are pre-normalized (lowercase, pipe-delimited,
/// `entity_type|`-prefixed) — the bit-exact contract the diff engine
/// depends on.
pub trait AnnotationsProvider {
    /// The last-persisted annotation state.
    fn current_annotations(&self) -> Result<AnnotationMap, StorageError>;

    /// Annotation state as of strictly before `before_time` (epoch
    /// seconds), reconstructed from history. This is the baseline side of
    /// every diff — there is no snapshot table.
    fn annotations_as_of(&self, before_time: i64) -> Result<AnnotationMap, StorageError>;

    /// Persist one annotation field value, recording history when the
    /// value changed. Returns whether anything was written. An empty
    /// `new_value` expresses removal; the underlying row is never deleted.
    fn persist_annotation(
        &self,
        entity_key: &EntityKey,
        field_name: &str,
        new_value: &str,
        changed_by: &str,
        changed_at: i64,
        audit_run_id: Option<i64>,
    ) -> Result<bool, StorageError>;
}
