//! Queries for the findings table — immutable per-run observations.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;
use sqlaudit_core::types::Finding;

/// A raw findings row. String-level; the provider layer converts to the
/// typed [`Finding`] with the lenient parsers.
#[derive(Debug, Clone)]
pub struct FindingRow {
    pub id: i64,
    pub audit_run_id: i64,
    pub instance_id: String,
    pub entity_type: String,
    pub entity_key: String,
    pub status: Option<String>,
    pub risk: Option<String>,
    pub description: String,
    pub created_at: i64,
}

/// Insert one finding. INSERT OR REPLACE keeps the per-run uniqueness
/// invariant even if a collector retries a partially-written run.
pub fn insert_finding(
    conn: &Connection,
    finding: &Finding,
    created_at: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO findings
            (audit_run_id, instance_id, entity_type, entity_key, status, risk, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            finding.audit_run_id,
            finding.instance_id,
            finding.entity_type.wire_name(),
            finding.entity_key.as_str(),
            finding.status.map(|s| s.as_str()),
            finding.risk.map(|r| r.as_str()),
            finding.description,
            created_at
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Query all findings for one run, ordered by entity key.
pub fn query_by_run(conn: &Connection, audit_run_id: i64) -> Result<Vec<FindingRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, audit_run_id, instance_id, entity_type, entity_key, status, risk, description, created_at
             FROM findings WHERE audit_run_id = ?1 ORDER BY entity_key",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![audit_run_id], |row| {
            Ok(FindingRow {
                id: row.get(0)?,
                audit_run_id: row.get(1)?,
                instance_id: row.get(2)?,
                entity_type: row.get(3)?,
                entity_key: row.get(4)?,
                status: row.get(5)?,
                risk: row.get(6)?,
                description: row.get(7)?,
                created_at: row.get(8)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Count findings for one run.
pub fn count_by_run(conn: &Connection, audit_run_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM findings WHERE audit_run_id = ?1",
        params![audit_run_id],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
