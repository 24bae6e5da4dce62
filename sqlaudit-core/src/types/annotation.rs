//! Annotations — human-entered metadata carried across runs.

use serde::{Deserialize, Serialize};

use crate::entity_key::EntityKey;

/// The only review-status value with reconciliation semantics. Anything
/// else in the column is free-text documentation.
pub const REVIEW_STATUS_EXCEPTION: &str = "Exception";

/// Persisted field names: the closed set of columns the annotation store
/// accepts.
pub const FIELD_JUSTIFICATION: &str = "justification";
pub const FIELD_REVIEW_STATUS: &str = "review_status";
pub const FIELD_NOTES: &str = "notes";

/// Fixed per-entity annotation record read from the spreadsheet or the
/// annotation store. Field names are closed at compile time, no ad-hoc
/// string-keyed maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFields {
    pub justification: Option<String>,
    pub review_status: Option<String>,
    pub notes: Option<String>,
}

impl AnnotationFields {
    /// True when the justification cell contains non-whitespace text.
    pub fn has_justification(&self) -> bool {
        self.justification
            .as_deref()
            .is_some_and(|j| !j.trim().is_empty())
    }

    /// True when every field is empty. Such records carry no signal and
    /// are skipped during persistence.
    pub fn is_empty(&self) -> bool {
        !self.has_justification()
            && self.review_status.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.notes.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    /// Write a field by its persisted name. Empty values store as `None`.
    /// Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        match name {
            FIELD_JUSTIFICATION => self.justification = value,
            FIELD_REVIEW_STATUS => self.review_status = value,
            FIELD_NOTES => self.notes = value,
            _ => {}
        }
    }

    /// Iterate `(field_name, value)` pairs in persisted order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (FIELD_JUSTIFICATION, self.justification.as_deref()),
            (FIELD_REVIEW_STATUS, self.review_status.as_deref()),
            (FIELD_NOTES, self.notes.as_deref()),
        ]
    }
}

/// Derived per-entity exception snapshot. Built fresh from annotation
/// reads at each sync; never persisted as its own row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub entity_key: EntityKey,
    pub has_justification: bool,
    pub justification_text: Option<String>,
    pub review_status: Option<String>,
    pub notes: Option<String>,
}

impl ExceptionInfo {
    pub fn from_annotations(entity_key: EntityKey, fields: &AnnotationFields) -> Self {
        Self {
            entity_key,
            has_justification: fields.has_justification(),
            justification_text: fields.justification.clone(),
            review_status: fields.review_status.clone(),
            notes: fields.notes.clone(),
        }
    }
}
