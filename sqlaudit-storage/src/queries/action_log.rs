//! Queries for the action_log table — append-only log of transitions.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::ActionEntry;

/// A persisted action-log row.
#[derive(Debug, Clone)]
pub struct ActionLogRow {
    pub id: i64,
    pub entity_key: String,
    pub change_type: String,
    pub action_status: String,
    pub notes: Option<String>,
    pub action_date: Option<i64>,
    pub audit_run_id: i64,
    pub created_at: i64,
}

/// Append an entry. INSERT OR IGNORE against the idempotency key
/// `(entity_key, change_type, audit_run_id)`; returns whether a row was
/// actually written.
pub fn append_action(
    conn: &Connection,
    entry: &ActionEntry,
    created_at: i64,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO action_log
                (entity_key, change_type, action_status, notes, action_date, audit_run_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.entity_key.as_str(),
                entry.change_type.as_str(),
                entry.action_status.as_str(),
                entry.notes,
                entry.action_date,
                entry.audit_run_id,
                created_at
            ],
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(changed > 0)
}

/// Query all entries for one run, ordered by entity key.
pub fn query_by_run(
    conn: &Connection,
    audit_run_id: i64,
) -> Result<Vec<ActionLogRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_key, change_type, action_status, notes, action_date, audit_run_id, created_at
             FROM action_log WHERE audit_run_id = ?1 ORDER BY entity_key",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![audit_run_id], map_action_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Query recent entries across runs, newest first.
pub fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<ActionLogRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, entity_key, change_type, action_status, notes, action_date, audit_run_id, created_at
             FROM action_log ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![limit as i64], map_action_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count all entries.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM action_log", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count entries for one run.
pub fn count_by_run(conn: &Connection, audit_run_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM action_log WHERE audit_run_id = ?1",
        params![audit_run_id],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count entries for one run grouped by change type.
pub fn count_by_change_type(
    conn: &Connection,
    audit_run_id: i64,
) -> Result<Vec<(String, u32)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT change_type, COUNT(*) FROM action_log
             WHERE audit_run_id = ?1 GROUP BY change_type",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![audit_run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

fn map_action_row(row: &rusqlite::Row) -> rusqlite::Result<ActionLogRow> {
    Ok(ActionLogRow {
        id: row.get(0)?,
        entity_key: row.get(1)?,
        change_type: row.get(2)?,
        action_status: row.get(3)?,
        notes: row.get(4)?,
        action_date: row.get(5)?,
        audit_run_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}
