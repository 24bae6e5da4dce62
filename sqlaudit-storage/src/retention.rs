//! Data retention policies for the audit database.
//!
//! Two tiers plus orphan cleanup:
//! - **Runs** (default 365 days): audit_runs and, transitively, the
//!   findings belonging to deleted runs.
//! - **History/log**: annotation_history (default 730 days — it is the
//!   source of "old annotation state", so it outlives the runs) and
//!   action_log (default 365 days).
//!
//! The annotations table itself is current state and is never aged out.

use rusqlite::{params, Connection};
use serde::Serialize;

use sqlaudit_core::config::RetentionConfig;
use sqlaudit_core::errors::StorageError;

/// Configurable retention periods.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Audit runs and their findings (default 365 days).
    pub runs_days: u32,
    /// Annotation history (default 730 days).
    pub history_days: u32,
    /// Action log (default 365 days).
    pub log_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            runs_days: 365,
            history_days: 730,
            log_days: 365,
        }
    }
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            runs_days: config.effective_runs_days(),
            history_days: config.effective_history_days(),
            log_days: config.effective_log_days(),
        }
    }
}

/// Report of what was cleaned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    pub total_deleted: u64,
    pub per_table: Vec<TableCleanup>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCleanup {
    pub table: String,
    pub deleted: u64,
}

/// Apply the full retention policy.
///
/// Runs inside a single transaction for atomicity.
/// Returns a report of how many rows were deleted per table.
pub fn apply_retention(
    conn: &Connection,
    policy: &RetentionPolicy,
) -> Result<RetentionReport, StorageError> {
    let start = std::time::Instant::now();
    let mut report = RetentionReport::default();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("retention begin: {e}"),
        })?;

    apply_retention_inner(&tx, policy, &mut report)?;

    tx.commit()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    report.duration_ms = start.elapsed().as_millis() as u64;
    report.total_deleted = report.per_table.iter().map(|t| t.deleted).sum();
    Ok(report)
}

fn apply_retention_inner(
    conn: &Connection,
    policy: &RetentionPolicy,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let now = sqlaudit_core::timeparse::now_epoch();

    let runs_cutoff = now - (policy.runs_days as i64 * 86400);
    let history_cutoff = now - (policy.history_days as i64 * 86400);
    let log_cutoff = now - (policy.log_days as i64 * 86400);

    cleanup_by_time(conn, "audit_runs", "started_at", runs_cutoff, report)?;

    // Orphan cleanup: findings whose run was just aged out.
    let deleted = conn
        .execute(
            "DELETE FROM findings WHERE audit_run_id NOT IN (SELECT id FROM audit_runs)",
            [],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("findings: {e}"),
        })? as u64;
    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: "findings (orphan)".to_string(),
            deleted,
        });
    }

    cleanup_by_time(conn, "annotation_history", "changed_at", history_cutoff, report)?;
    cleanup_by_time(conn, "action_log", "created_at", log_cutoff, report)?;

    Ok(())
}

/// Delete rows from `table` where `time_column` < `cutoff`.
fn cleanup_by_time(
    conn: &Connection,
    table: &str,
    time_column: &str,
    cutoff: i64,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    // Table/column names are hardcoded strings from this module.
    let sql = format!("DELETE FROM {table} WHERE {time_column} < ?1");
    let deleted = conn
        .execute(&sql, params![cutoff])
        .map_err(|e| StorageError::SqliteError {
            message: format!("{table}: {e}"),
        })? as u64;

    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: table.to_string(),
            deleted,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn now() -> i64 {
        sqlaudit_core::timeparse::now_epoch()
    }

    #[test]
    fn test_old_runs_and_their_findings_are_deleted() {
        let conn = setup_db();
        let old = now() - 400 * 86400;

        conn.execute(
            "INSERT INTO audit_runs (started_at, scope, status) VALUES (?1, 'prod', 'completed')",
            params![old],
        )
        .unwrap();
        let old_run = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO audit_runs (started_at, scope, status) VALUES (?1, 'prod', 'completed')",
            params![now() - 86400],
        )
        .unwrap();
        let fresh_run = conn.last_insert_rowid();

        for run in [old_run, fresh_run] {
            conn.execute(
                "INSERT INTO findings (audit_run_id, instance_id, entity_type, entity_key, status, created_at)
                 VALUES (?1, 'srv1', 'login', 'login|srv1|sa', 'FAIL', ?2)",
                params![run, now()],
            )
            .unwrap();
        }

        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();
        assert!(report.total_deleted >= 2);

        let runs: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_runs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(runs, 1);

        let findings: i64 = conn
            .query_row("SELECT COUNT(*) FROM findings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(findings, 1, "findings of the deleted run should go with it");
    }

    #[test]
    fn test_history_outlives_action_log() {
        let conn = setup_db();
        let between = now() - 500 * 86400; // older than log window, inside history window

        conn.execute(
            "INSERT INTO annotation_history (entity_type, entity_key, field_name, new_value, changed_at)
             VALUES ('login', 'login|srv1|sa', 'justification', 'legacy app', ?1)",
            params![between],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO action_log (entity_key, change_type, action_status, audit_run_id, created_at)
             VALUES ('login|srv1|sa', 'FIXED', 'CLOSED', 1, ?1)",
            params![between],
        )
        .unwrap();

        apply_retention(&conn, &RetentionPolicy::default()).unwrap();

        let history: i64 = conn
            .query_row("SELECT COUNT(*) FROM annotation_history", [], |r| r.get(0))
            .unwrap();
        let log: i64 = conn
            .query_row("SELECT COUNT(*) FROM action_log", [], |r| r.get(0))
            .unwrap();
        assert_eq!(history, 1);
        assert_eq!(log, 0);
    }

    #[test]
    fn test_empty_db_no_errors() {
        let conn = setup_db();
        let report = apply_retention(&conn, &RetentionPolicy::default()).unwrap();
        assert_eq!(report.total_deleted, 0);
    }
}
