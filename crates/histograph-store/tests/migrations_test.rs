//! Migration Framework Tests
//!
//! ## Scenarios Covered
//!
//! 1. Empty database receives the full schema
//! 2. Re-running migrations is a no-op
//! 3. An applied migration whose recorded checksum differs is refused

use histograph_core::ExErrorKind;
use histograph_store::migrations::{applied_migrations, apply_migrations};
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // GIVEN an empty database
    let mut conn = setup_test_db();

    // WHEN migrations are applied
    apply_migrations(&mut conn).unwrap();

    // THEN every table exists (sqlite_sequence comes from AUTOINCREMENT)
    let tables = get_table_names(&conn);
    for expected in ["commits", "schema_version", "snapshots", "sqlite_sequence"] {
        assert!(tables.contains(&expected.to_string()), "Missing table: {}", expected);
    }
    assert_eq!(
        applied_migrations(&conn).unwrap(),
        vec!["001_commits_and_snapshots", "002_snapshot_history_index"]
    );
}

#[test]
fn test_migrations_are_idempotent() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    apply_migrations(&mut conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_modified_migration_is_refused() {
    // GIVEN a database whose record of migration 001 no longer matches
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_commits_and_snapshots'",
        [],
    )
    .unwrap();

    // WHEN migrations run again
    let err = apply_migrations(&mut conn).unwrap_err();

    // THEN the run stops with a persistence error
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("migration_checksum"));
    assert!(err.message().contains("001_commits_and_snapshots"));
}
