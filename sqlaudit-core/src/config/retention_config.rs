//! Retention configuration.

use serde::{Deserialize, Serialize};

/// Retention windows for the append-only tables, in days.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetentionConfig {
    /// Audit runs (and their findings). Default: 365.
    pub runs_days: Option<u32>,
    /// Annotation history. Default: 730. History is what "old annotation
    /// state" is derived from, so it outlives the runs.
    pub history_days: Option<u32>,
    /// Action log. Default: 365.
    pub log_days: Option<u32>,
}

impl RetentionConfig {
    pub fn effective_runs_days(&self) -> u32 {
        self.runs_days.unwrap_or(365)
    }

    pub fn effective_history_days(&self) -> u32 {
        self.history_days.unwrap_or(730)
    }

    pub fn effective_log_days(&self) -> u32 {
        self.log_days.unwrap_or(365)
    }
}
