//! V001: Initial schema.
//! audit_runs, findings, annotations, annotation_history, action_log.

pub const MIGRATION_SQL: &str = r#"
-- Audit runs: append-only log of collection/sync cycles.
CREATE TABLE IF NOT EXISTS audit_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    scope TEXT NOT NULL,
    total_instances INTEGER,
    scanned_instances INTEGER,
    unreachable_instances INTEGER,
    finding_count INTEGER,
    duration_ms INTEGER,
    status TEXT NOT NULL DEFAULT 'running',
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_audit_runs_time
    ON audit_runs(started_at DESC);

-- Findings: written once per run, never mutated.
-- The UNIQUE triple enforces "at most one finding per entity per run".
CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    audit_run_id INTEGER NOT NULL,
    instance_id TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    status TEXT,
    risk TEXT,
    description TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    UNIQUE(audit_run_id, entity_type, entity_key)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_findings_run ON findings(audit_run_id);
CREATE INDEX IF NOT EXISTS idx_findings_key ON findings(entity_key);

-- Annotations: one row per (entity_type, entity_key, field_name).
-- Rows are never deleted; "removal" is an empty field_value.
CREATE TABLE IF NOT EXISTS annotations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    field_name TEXT NOT NULL,
    field_value TEXT NOT NULL DEFAULT '',
    status_override TEXT,
    created_at INTEGER NOT NULL,
    modified_at INTEGER NOT NULL,
    modified_by TEXT,
    UNIQUE(entity_type, entity_key, field_name)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_annotations_key ON annotations(entity_key);

-- Annotation history: append-only event log. "Old annotation state" for a
-- sync is always derived from here; there is no snapshot table.
CREATE TABLE IF NOT EXISTS annotation_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    field_name TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    old_status TEXT,
    new_status TEXT,
    changed_at INTEGER NOT NULL,
    changed_by TEXT,
    audit_run_id INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_annotation_history_key
    ON annotation_history(entity_key, field_name, changed_at);

-- Action log: append-only record of logged transitions.
-- The UNIQUE triple is the idempotency key guarding double-invocation.
CREATE TABLE IF NOT EXISTS action_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_key TEXT NOT NULL,
    change_type TEXT NOT NULL,
    action_status TEXT NOT NULL,
    notes TEXT,
    action_date INTEGER,
    audit_run_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(entity_key, change_type, audit_run_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_action_log_run ON action_log(audit_run_id);
CREATE INDEX IF NOT EXISTS idx_action_log_time ON action_log(created_at DESC);
"#;
