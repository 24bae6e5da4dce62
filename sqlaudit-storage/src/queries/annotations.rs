//! Queries for annotations and their append-only history.
//!
//! Every value change appends an annotation_history row; an unchanged
//! upsert writes nothing at all. That no-op path is what keeps repeated
//! syncs from manufacturing history, so it is load-bearing — see the
//! idempotence tests.

use rusqlite::{params, Connection, OptionalExtension};
use sqlaudit_core::errors::StorageError;

/// A persisted annotation row.
#[derive(Debug, Clone)]
pub struct AnnotationRow {
    pub id: i64,
    pub entity_type: String,
    pub entity_key: String,
    pub field_name: String,
    pub field_value: String,
    pub status_override: Option<String>,
    pub created_at: i64,
    pub modified_at: i64,
    pub modified_by: Option<String>,
}

/// An annotation history row.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub id: i64,
    pub entity_type: String,
    pub entity_key: String,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub changed_at: i64,
    pub changed_by: Option<String>,
    pub audit_run_id: Option<i64>,
}

/// Upsert one annotation field, appending a history row when (and only
/// when) the value or status actually changed. Returns whether a change
/// was written. An empty `new_value` expresses removal; the row stays.
#[allow(clippy::too_many_arguments)]
pub fn upsert_annotation(
    conn: &Connection,
    entity_type: &str,
    entity_key: &str,
    field_name: &str,
    new_value: &str,
    new_status: Option<&str>,
    changed_by: &str,
    changed_at: i64,
    audit_run_id: Option<i64>,
) -> Result<bool, StorageError> {
    let existing: Option<(i64, String, Option<String>)> = conn
        .query_row(
            "SELECT created_at, field_value, status_override FROM annotations
             WHERE entity_type = ?1 AND entity_key = ?2 AND field_name = ?3",
            params![entity_type, entity_key, field_name],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let (created_at, old_value, old_status) = match existing {
        Some((created, value, status)) => {
            if value == new_value && status.as_deref() == new_status {
                return Ok(false);
            }
            (created, Some(value), status)
        }
        None => {
            // Nothing stored and nothing to store: skip entirely.
            if new_value.is_empty() && new_status.is_none() {
                return Ok(false);
            }
            (changed_at, None, None)
        }
    };

    conn.execute(
        "INSERT OR REPLACE INTO annotations
            (entity_type, entity_key, field_name, field_value, status_override,
             created_at, modified_at, modified_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entity_type, entity_key, field_name, new_value, new_status,
            created_at, changed_at, changed_by
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    conn.execute(
        "INSERT INTO annotation_history
            (entity_type, entity_key, field_name, old_value, new_value,
             old_status, new_status, changed_at, changed_by, audit_run_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entity_type, entity_key, field_name, old_value, new_value,
            old_status, new_status, changed_at, changed_by, audit_run_id
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    Ok(true)
}

/// Query all annotation rows.
pub fn query_all(conn: &Connection) -> Result<Vec<AnnotationRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_type, entity_key, field_name, field_value, status_override,
                    created_at, modified_at, modified_by
             FROM annotations ORDER BY entity_key, field_name",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map([], map_annotation_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Query annotation rows for one entity key.
pub fn query_for_key(
    conn: &Connection,
    entity_key: &str,
) -> Result<Vec<AnnotationRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_type, entity_key, field_name, field_value, status_override,
                    created_at, modified_at, modified_by
             FROM annotations WHERE entity_key = ?1 ORDER BY field_name",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![entity_key], map_annotation_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// The value a field held strictly before `before_time`: the most recent
/// pre-cutoff history entry's `new_value`, or — when the field's first
/// recorded change happened after the cutoff — that first entry's
/// `old_value`. No history at all means the field did not exist.
pub fn get_annotation_as_of(
    conn: &Connection,
    entity_key: &str,
    field_name: &str,
    before_time: i64,
) -> Result<Option<String>, StorageError> {
    let latest_before: Option<Option<String>> = conn
        .query_row(
            "SELECT new_value FROM annotation_history
             WHERE entity_key = ?1 AND field_name = ?2 AND changed_at < ?3
             ORDER BY changed_at DESC, id DESC LIMIT 1",
            params![entity_key, field_name, before_time],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    if let Some(value) = latest_before {
        return Ok(value);
    }

    let earliest_after: Option<Option<String>> = conn
        .query_row(
            "SELECT old_value FROM annotation_history
             WHERE entity_key = ?1 AND field_name = ?2 AND changed_at >= ?3
             ORDER BY changed_at ASC, id ASC LIMIT 1",
            params![entity_key, field_name, before_time],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    Ok(earliest_after.flatten())
}

/// Reconstruct the full `(entity_key, field_name) → value` state as of
/// strictly before `before_time`. Same semantics as
/// [`get_annotation_as_of`], computed in two passes: a window query for
/// fields with pre-cutoff history, then the `old_value` of the earliest
/// post-cutoff entry for fields first changed afterwards.
pub fn query_state_as_of(
    conn: &Connection,
    before_time: i64,
) -> Result<Vec<(String, String, Option<String>)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_key, field_name, new_value
             FROM (
                 SELECT entity_key, field_name, new_value,
                        ROW_NUMBER() OVER (PARTITION BY entity_key, field_name
                                           ORDER BY changed_at DESC, id DESC) AS rn
                 FROM annotation_history WHERE changed_at < ?1
             ) WHERE rn = 1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![before_time], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get(2)?))
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut state = rows
        .collect::<Result<Vec<(String, String, Option<String>)>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut seen: std::collections::HashSet<(String, String)> = state
        .iter()
        .map(|(k, f, _)| (k.clone(), f.clone()))
        .collect();

    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_key, field_name, old_value
             FROM (
                 SELECT entity_key, field_name, old_value,
                        ROW_NUMBER() OVER (PARTITION BY entity_key, field_name
                                           ORDER BY changed_at ASC, id ASC) AS rn
                 FROM annotation_history WHERE changed_at >= ?1
             ) WHERE rn = 1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let later = stmt
        .query_map(params![before_time], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get(2)?))
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    for row in later {
        let (key, field, old_value): (String, String, Option<String>) =
            row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        if old_value.is_some() && seen.insert((key.clone(), field.clone())) {
            state.push((key, field, old_value));
        }
    }

    Ok(state)
}

/// Query history rows for one entity key, oldest first.
pub fn query_history_for_key(
    conn: &Connection,
    entity_key: &str,
) -> Result<Vec<HistoryRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_type, entity_key, field_name, old_value, new_value,
                    old_status, new_status, changed_at, changed_by, audit_run_id
             FROM annotation_history WHERE entity_key = ?1
             ORDER BY changed_at ASC, id ASC",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![entity_key], |row| {
            Ok(HistoryRow {
                id: row.get(0)?,
                entity_type: row.get(1)?,
                entity_key: row.get(2)?,
                field_name: row.get(3)?,
                old_value: row.get(4)?,
                new_value: row.get(5)?,
                old_status: row.get(6)?,
                new_status: row.get(7)?,
                changed_at: row.get(8)?,
                changed_by: row.get(9)?,
                audit_run_id: row.get(10)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count history rows (all keys).
pub fn count_history(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM annotation_history", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

fn map_annotation_row(row: &rusqlite::Row) -> rusqlite::Result<AnnotationRow> {
    Ok(AnnotationRow {
        id: row.get(0)?,
        entity_type: row.get(1)?,
        entity_key: row.get(2)?,
        field_name: row.get(3)?,
        field_value: row.get(4)?,
        status_override: row.get(5)?,
        created_at: row.get(6)?,
        modified_at: row.get(7)?,
        modified_by: row.get(8)?,
    })
}
