//! Materialized status view — aggregated compliance posture.
//!
//! Counts here must agree with the engine-side `ComplianceStats` for the
//! same run; the eligibility rule (discrepant AND justified-or-excepted)
//! is deliberately expressed once per layer and covered by a shared test.

use rusqlite::{params, Connection};
use sqlaudit_core::errors::StorageError;

/// Aggregated compliance posture for the latest audit run.
#[derive(Debug, Clone, Default)]
pub struct StatusView {
    pub active_issues: u32,
    pub documented_exceptions: u32,
    pub compliant_items: u32,
    pub unknown_items: u32,
    pub finding_count: u32,
    pub last_run_id: i64,
    pub last_run_at: i64,
}

/// Refresh the status view from the latest run's findings joined with the
/// current annotations.
pub fn refresh_status(conn: &Connection) -> Result<StatusView, StorageError> {
    let last_run: Option<(i64, i64)> = conn
        .query_row(
            "SELECT id, started_at FROM audit_runs ORDER BY started_at DESC, id DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .ok();

    let (last_run_id, last_run_at) = match last_run {
        Some(pair) => pair,
        None => return Ok(StatusView::default()),
    };

    let discrepant: u32 = count_where(
        conn,
        "f.status IN ('FAIL', 'WARN')",
        last_run_id,
    )?;

    let documented_exceptions: u32 = count_where(
        conn,
        "f.status IN ('FAIL', 'WARN') AND (
            EXISTS (SELECT 1 FROM annotations a
                    WHERE a.entity_key = f.entity_key
                      AND a.field_name = 'justification'
                      AND TRIM(a.field_value) != '')
            OR EXISTS (SELECT 1 FROM annotations a
                    WHERE a.entity_key = f.entity_key
                      AND a.field_name = 'review_status'
                      AND TRIM(a.field_value) = 'Exception')
        )",
        last_run_id,
    )?;

    let compliant_items: u32 = count_where(conn, "f.status = 'PASS'", last_run_id)?;
    let unknown_items: u32 = count_where(conn, "f.status IS NULL", last_run_id)?;
    let finding_count: u32 = count_where(conn, "1=1", last_run_id)?;

    Ok(StatusView {
        active_issues: discrepant - documented_exceptions,
        documented_exceptions,
        compliant_items,
        unknown_items,
        finding_count,
        last_run_id,
        last_run_at,
    })
}

fn count_where(conn: &Connection, predicate: &str, run_id: i64) -> Result<u32, StorageError> {
    // Predicates are hardcoded strings from this module, never user input.
    let sql = format!("SELECT COUNT(*) FROM findings f WHERE f.audit_run_id = ?1 AND {predicate}");
    conn.query_row(&sql, params![run_id], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
