//! Tests for the sqlaudit configuration system.

use std::sync::Mutex;

use sqlaudit_core::config::AuditConfig;
use sqlaudit_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all SQLAUDIT_ env vars to prevent cross-test contamination.
fn clear_sqlaudit_env_vars() {
    for key in [
        "SQLAUDIT_DB_PATH",
        "SQLAUDIT_DB_BUSY_TIMEOUT_MS",
        "SQLAUDIT_SYNC_MODIFIED_BY",
        "SQLAUDIT_RETENTION_RUNS_DAYS",
        "SQLAUDIT_RETENTION_HISTORY_DAYS",
        "SQLAUDIT_RETENTION_LOG_DAYS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution_env_beats_project() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_sqlaudit_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("sqlaudit.toml"),
        r#"
[database]
path = "project.db"

[retention]
runs_days = 30
"#,
    )
    .unwrap();

    std::env::set_var("SQLAUDIT_RETENTION_RUNS_DAYS", "90");

    let config = AuditConfig::load(dir.path()).unwrap();

    // Env overrides project for runs_days
    assert_eq!(config.retention.runs_days, Some(90));
    // Project value survives where no env override exists
    assert_eq!(
        config.database.effective_path(),
        std::path::PathBuf::from("project.db")
    );

    clear_sqlaudit_env_vars();
}

#[test]
fn test_load_missing_files_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_sqlaudit_env_vars();

    let dir = tempdir();
    let config = AuditConfig::load(dir.path()).unwrap();

    assert_eq!(
        config.database.effective_path(),
        std::path::PathBuf::from("sqlaudit.db")
    );
    assert_eq!(config.sync.effective_modified_by(), "sync-engine");
    assert_eq!(config.retention.effective_runs_days(), 365);
    assert_eq!(config.retention.effective_history_days(), 730);
    assert_eq!(config.retention.effective_log_days(), 365);
}

#[test]
fn test_from_toml() {
    let config = AuditConfig::from_toml(
        r#"
[sync]
modified_by = "dba-team"

[retention]
history_days = 120
"#,
    )
    .unwrap();

    assert_eq!(config.sync.effective_modified_by(), "dba-team");
    assert_eq!(config.retention.effective_history_days(), 120);
    // Untouched sections keep defaults
    assert_eq!(config.retention.effective_runs_days(), 365);
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let err = AuditConfig::from_toml("this is not toml ===").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_zero_retention_rejected() {
    let err = AuditConfig::from_toml(
        r#"
[retention]
log_days = 0
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "retention.log_days"));
}

#[test]
fn test_to_toml_roundtrip() {
    let config = AuditConfig::from_toml(
        r#"
[database]
path = "audit.db"
"#,
    )
    .unwrap();
    let rendered = config.to_toml().unwrap();
    let reparsed = AuditConfig::from_toml(&rendered).unwrap();
    assert_eq!(
        reparsed.database.effective_path(),
        std::path::PathBuf::from("audit.db")
    );
}
