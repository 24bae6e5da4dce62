//! Schema migrations, tracked via `PRAGMA user_version`.

pub mod v001_initial;

use rusqlite::Connection;
use sqlaudit_core::errors::StorageError;

const MIGRATIONS: &[(u32, &str)] = &[(1, v001_initial::MIGRATION_SQL)];

/// Run all pending migrations. Idempotent: already-applied versions are
/// skipped based on `user_version`.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    for (version, sql) in MIGRATIONS {
        if i64::from(*version) > current {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
        }
    }
    Ok(())
}
