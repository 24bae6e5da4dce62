//! Database configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the audit database file. Default: `sqlaudit.db`.
    pub path: Option<std::path::PathBuf>,
    /// Busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u32>,
}

impl DatabaseConfig {
    /// Returns the effective database path, defaulting to `sqlaudit.db`.
    pub fn effective_path(&self) -> std::path::PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("sqlaudit.db"))
    }

    /// Returns the effective busy timeout, defaulting to 5000 ms.
    pub fn effective_busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms.unwrap_or(5000)
    }
}
