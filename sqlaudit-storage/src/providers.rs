//! Provider-trait implementations backed by the SQLite store.
//!
//! Rows travel string-level through the query modules; the lenient
//! domain parsers are applied exactly once, here at the seam.

use sqlaudit_core::entity_key::EntityKey;
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::timeparse::now_epoch;
use sqlaudit_core::traits::{ActionSink, AnnotationMap, AnnotationsProvider, FindingsProvider};
use sqlaudit_core::types::{ActionEntry, AnnotationFields, EntityType, Finding, FindingStatus, RiskLevel};

use crate::queries::{action_log, annotations, audit_runs, findings};
use crate::Database;

impl FindingsProvider for Database {
    fn findings_for_run(&self, audit_run_id: i64) -> Result<Vec<Finding>, StorageError> {
        self.with_conn(|conn| {
            let rows = findings::query_by_run(conn, audit_run_id)?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let Some(entity_type) = EntityType::parse(&row.entity_type) else {
                    tracing::warn!(
                        entity_type = %row.entity_type,
                        entity_key = %row.entity_key,
                        "skipping finding with unknown entity type"
                    );
                    continue;
                };
                out.push(Finding {
                    audit_run_id: row.audit_run_id,
                    instance_id: row.instance_id,
                    entity_type,
                    entity_key: EntityKey::normalize(&row.entity_key),
                    status: FindingStatus::parse_opt(row.status.as_deref()),
                    risk: row.risk.as_deref().and_then(RiskLevel::parse),
                    description: row.description,
                });
            }
            Ok(out)
        })
    }

    fn run_exists(&self, audit_run_id: i64) -> Result<bool, StorageError> {
        self.with_conn(|conn| Ok(audit_runs::get_run(conn, audit_run_id)?.is_some()))
    }
}

impl AnnotationsProvider for Database {
    fn current_annotations(&self) -> Result<AnnotationMap, StorageError> {
        self.with_conn(|conn| {
            let rows = annotations::query_all(conn)?;
            let mut map = AnnotationMap::default();
            for row in rows {
                let key = EntityKey::normalize(&row.entity_key);
                map.entry(key)
                    .or_insert_with(AnnotationFields::default)
                    .set_field(&row.field_name, Some(row.field_value));
            }
            map.retain(|_, fields| !fields.is_empty());
            Ok(map)
        })
    }

    fn annotations_as_of(&self, before_time: i64) -> Result<AnnotationMap, StorageError> {
        self.with_conn(|conn| {
            let state = annotations::query_state_as_of(conn, before_time)?;
            let mut map = AnnotationMap::default();
            for (entity_key, field_name, value) in state {
                let key = EntityKey::normalize(&entity_key);
                map.entry(key)
                    .or_insert_with(AnnotationFields::default)
                    .set_field(&field_name, value);
            }
            map.retain(|_, fields| !fields.is_empty());
            Ok(map)
        })
    }

    fn persist_annotation(
        &self,
        entity_key: &EntityKey,
        field_name: &str,
        new_value: &str,
        changed_by: &str,
        changed_at: i64,
        audit_run_id: Option<i64>,
    ) -> Result<bool, StorageError> {
        let entity_type = entity_key.type_prefix().unwrap_or("unknown").to_string();
        self.with_conn(|conn| {
            annotations::upsert_annotation(
                conn,
                &entity_type,
                entity_key.as_str(),
                field_name,
                new_value,
                None,
                changed_by,
                changed_at,
                audit_run_id,
            )
        })
    }
}

impl ActionSink for Database {
    fn append(&self, entry: &ActionEntry) -> Result<bool, StorageError> {
        self.with_conn(|conn| action_log::append_action(conn, entry, now_epoch()))
    }
}
