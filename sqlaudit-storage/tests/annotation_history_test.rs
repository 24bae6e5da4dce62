//! Tests for annotation upserts, history append, and as-of reconstruction.

use rusqlite::Connection;
use sqlaudit_storage::migrations::run_migrations;
use sqlaudit_storage::queries::annotations::*;

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

const KEY: &str = "login|srv1|prod|sa";

#[test]
fn first_upsert_creates_row_and_history() {
    let conn = setup_db();
    let changed = upsert_annotation(
        &conn, "login", KEY, "justification", "legacy app needs sa",
        None, "dba", 1700000000, Some(1),
    )
    .unwrap();
    assert!(changed);

    let rows = query_for_key(&conn, KEY).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field_value, "legacy app needs sa");
    assert_eq!(rows[0].modified_by.as_deref(), Some("dba"));

    let history = query_history_for_key(&conn, KEY).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_value, None);
    assert_eq!(history[0].new_value.as_deref(), Some("legacy app needs sa"));
    assert_eq!(history[0].audit_run_id, Some(1));
}

#[test]
fn unchanged_upsert_is_a_noop() {
    let conn = setup_db();
    upsert_annotation(&conn, "login", KEY, "justification", "x", None, "dba", 1700000000, None)
        .unwrap();

    // Same value again: no write, no history
    let changed = upsert_annotation(
        &conn, "login", KEY, "justification", "x", None, "dba", 1700005000, None,
    )
    .unwrap();
    assert!(!changed);
    assert_eq!(count_history(&conn).unwrap(), 1);

    // And the annotation's modified_at was not touched
    let rows = query_for_key(&conn, KEY).unwrap();
    assert_eq!(rows[0].modified_at, 1700000000);
}

#[test]
fn empty_upsert_on_missing_row_writes_nothing() {
    let conn = setup_db();
    let changed =
        upsert_annotation(&conn, "login", KEY, "review_status", "", None, "dba", 1700000000, None)
            .unwrap();
    assert!(!changed);
    assert_eq!(count_history(&conn).unwrap(), 0);
    assert!(query_for_key(&conn, KEY).unwrap().is_empty());
}

#[test]
fn clearing_keeps_row_with_empty_value() {
    let conn = setup_db();
    upsert_annotation(&conn, "login", KEY, "review_status", "Exception", None, "dba", 1700000000, None)
        .unwrap();
    let changed =
        upsert_annotation(&conn, "login", KEY, "review_status", "", None, "sync-engine", 1700001000, Some(2))
            .unwrap();
    assert!(changed);

    // Row survives with empty value — never deleted
    let rows = query_for_key(&conn, KEY).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field_value, "");

    let history = query_history_for_key(&conn, KEY).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].old_value.as_deref(), Some("Exception"));
    assert_eq!(history[1].new_value.as_deref(), Some(""));
    assert_eq!(history[1].changed_by.as_deref(), Some("sync-engine"));
}

#[test]
fn as_of_returns_pre_cutoff_value_after_later_edits() {
    let conn = setup_db();
    upsert_annotation(&conn, "login", KEY, "justification", "v1", None, "dba", 1000, None).unwrap();
    upsert_annotation(&conn, "login", KEY, "justification", "v2", None, "dba", 2000, None).unwrap();
    upsert_annotation(&conn, "login", KEY, "justification", "v3", None, "dba", 3000, None).unwrap();

    assert_eq!(
        get_annotation_as_of(&conn, KEY, "justification", 2500).unwrap(),
        Some("v2".to_string())
    );
    assert_eq!(
        get_annotation_as_of(&conn, KEY, "justification", 5000).unwrap(),
        Some("v3".to_string())
    );
    // Cutoff is strict: a change at exactly t is not visible "as of" t
    assert_eq!(
        get_annotation_as_of(&conn, KEY, "justification", 1000).unwrap(),
        None
    );
    assert_eq!(get_annotation_as_of(&conn, KEY, "notes", 5000).unwrap(), None);
}

#[test]
fn state_as_of_reconstructs_full_map() {
    let conn = setup_db();
    let other = "database|srv1|hrdb";
    upsert_annotation(&conn, "login", KEY, "justification", "old text", None, "dba", 1000, None)
        .unwrap();
    upsert_annotation(&conn, "database", other, "review_status", "Exception", None, "dba", 1500, None)
        .unwrap();
    // Edits after the cutoff must not leak into the baseline
    upsert_annotation(&conn, "login", KEY, "justification", "new text", None, "dba", 9000, None)
        .unwrap();

    let state = query_state_as_of(&conn, 2000).unwrap();
    let mut state: Vec<_> = state
        .into_iter()
        .map(|(k, f, v)| (k, f, v.unwrap_or_default()))
        .collect();
    state.sort();

    assert_eq!(
        state,
        vec![
            (other.to_string(), "review_status".to_string(), "Exception".to_string()),
            (KEY.to_string(), "justification".to_string(), "old text".to_string()),
        ]
    );
}
