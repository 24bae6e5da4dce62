//! Top-level sqlaudit configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DatabaseConfig, RetentionConfig, SyncConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`SQLAUDIT_*`)
/// 2. Project config (`sqlaudit.toml` in project root)
/// 3. User config (`~/.sqlaudit/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub retention: RetentionConfig,
}

impl AuditConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(_) => {
                        // Non-parse errors from user config are warnings, not fatal.
                    }
                }
            }
        }

        // Layer 2: project config
        let project_config_path = root.join("sqlaudit.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 1 (highest priority): environment variables
        Self::apply_env_overrides(&mut config);

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
        for (field, value) in [
            ("retention.runs_days", config.retention.runs_days),
            ("retention.history_days", config.retention.history_days),
            ("retention.log_days", config.retention.log_days),
        ] {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if config.database.busy_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "database.busy_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.sqlaudit/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        home_dir().map(|h| h.join(".sqlaudit").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut AuditConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: AuditConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base`
    /// values only when `other` has a `Some` value.
    fn merge(base: &mut AuditConfig, other: &AuditConfig) {
        if other.database.path.is_some() {
            base.database.path = other.database.path.clone();
        }
        if other.database.busy_timeout_ms.is_some() {
            base.database.busy_timeout_ms = other.database.busy_timeout_ms;
        }
        if other.sync.modified_by.is_some() {
            base.sync.modified_by = other.sync.modified_by.clone();
        }
        if other.retention.runs_days.is_some() {
            base.retention.runs_days = other.retention.runs_days;
        }
        if other.retention.history_days.is_some() {
            base.retention.history_days = other.retention.history_days;
        }
        if other.retention.log_days.is_some() {
            base.retention.log_days = other.retention.log_days;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `SQLAUDIT_DB_PATH`, `SQLAUDIT_RETENTION_RUNS_DAYS`, etc.
    fn apply_env_overrides(config: &mut AuditConfig) {
        if let Ok(val) = std::env::var("SQLAUDIT_DB_PATH") {
            if !val.is_empty() {
                config.database.path = Some(std::path::PathBuf::from(val));
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_DB_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u32>() {
                config.database.busy_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_SYNC_MODIFIED_BY") {
            if !val.is_empty() {
                config.sync.modified_by = Some(val);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_RETENTION_RUNS_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.runs_days = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_RETENTION_HISTORY_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.history_days = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SQLAUDIT_RETENTION_LOG_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.log_days = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
