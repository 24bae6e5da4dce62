//! Sync-cycle configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Author recorded on engine-side annotation writes (auto-clears).
    /// Default: `sync-engine`.
    pub modified_by: Option<String>,
}

impl SyncConfig {
    /// Returns the effective author name, defaulting to `sync-engine`.
    pub fn effective_modified_by(&self) -> &str {
        self.modified_by.as_deref().unwrap_or("sync-engine")
    }
}
