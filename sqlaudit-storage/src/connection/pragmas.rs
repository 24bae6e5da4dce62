//! Connection pragmas applied to every connection at open.

use rusqlite::Connection;
use sqlaudit_core::errors::StorageError;

/// Apply the standard pragma set: WAL journaling, NORMAL sync, foreign
/// keys on, a busy timeout for the rare second reader.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    // journal_mode returns a result row, so it goes through pragma_update
    // like the rest.
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(map_err)?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(map_err)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(map_err)?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(map_err)?;
    conn.pragma_update(None, "temp_store", "MEMORY")
        .map_err(map_err)?;
    Ok(())
}

fn map_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
