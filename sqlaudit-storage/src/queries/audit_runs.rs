//! Queries for the audit_runs table — append-only log of audit cycles.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;

/// An audit run record.
#[derive(Debug, Clone)]
pub struct AuditRunRow {
    pub id: i64,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub scope: String,
    pub total_instances: Option<i64>,
    pub scanned_instances: Option<i64>,
    pub unreachable_instances: Option<i64>,
    pub finding_count: Option<i64>,
    pub duration_ms: Option<i64>,
    pub status: String,
    pub error: Option<String>,
}

/// Insert a new audit run record (status = 'running'). Returns the row id.
pub fn insert_run_start(
    conn: &Connection,
    started_at: i64,
    scope: &str,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO audit_runs (started_at, scope, status) VALUES (?1, ?2, 'running')",
        params![started_at, scope],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(conn.last_insert_rowid())
}

/// Update an audit run record with completion data.
#[allow(clippy::too_many_arguments)]
pub fn update_run_complete(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    total_instances: i64,
    scanned_instances: i64,
    unreachable_instances: i64,
    finding_count: i64,
    duration_ms: i64,
    status: &str,
    error: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE audit_runs SET
            completed_at = ?1, total_instances = ?2, scanned_instances = ?3,
            unreachable_instances = ?4, finding_count = ?5, duration_ms = ?6,
            status = ?7, error = ?8
         WHERE id = ?9",
        params![
            completed_at, total_instances, scanned_instances,
            unreachable_instances, finding_count, duration_ms, status, error, id
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Get a single run by id. Returns None if it doesn't exist.
pub fn get_run(conn: &Connection, id: i64) -> Result<Option<AuditRunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, scope, total_instances, scanned_instances,
                    unreachable_instances, finding_count, duration_ms, status, error
             FROM audit_runs WHERE id = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let result = stmt.query_row(params![id], map_run_row);
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::SqliteError { message: e.to_string() }),
    }
}

/// Query recent audit runs, newest first.
pub fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<AuditRunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, scope, total_instances, scanned_instances,
                    unreachable_instances, finding_count, duration_ms, status, error
             FROM audit_runs ORDER BY started_at DESC LIMIT ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![limit as i64], map_run_row)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count total audit run entries.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM audit_runs", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

fn map_run_row(row: &rusqlite::Row) -> rusqlite::Result<AuditRunRow> {
    Ok(AuditRunRow {
        id: row.get(0)?,
        started_at: row.get(1)?,
        completed_at: row.get(2)?,
        scope: row.get(3)?,
        total_instances: row.get(4)?,
        scanned_instances: row.get(5)?,
        unreachable_instances: row.get(6)?,
        finding_count: row.get(7)?,
        duration_ms: row.get(8)?,
        status: row.get(9)?,
        error: row.get(10)?,
    })
}
