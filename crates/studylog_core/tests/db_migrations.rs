use rusqlite::{params, Connection};
use studylog_core::db::migrations::latest_version;
use studylog_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "study_logs");
    assert_index_exists(&conn, "idx_study_logs_date");
    assert_index_exists(&conn, "idx_study_logs_category_date");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studylog.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "study_logs");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failing_migration_reports_versions_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("half_built.db");

    // Claims version 1 but lacks the table the index migration targets.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.failed_migration_version(), Some(2));
    match &err {
        DbError::Migration {
            from_version,
            failed_version,
            ..
        } => {
            assert_eq!(*from_version, 1);
            assert_eq!(*failed_version, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
}

#[test]
fn schema_rejects_rows_that_break_record_invariants() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO study_logs (
            title, content, category, understanding,
            study_time_minutes, study_date, created_at, updated_at
        ) VALUES (?1, 'body', 'JAVA', 'GOOD', ?2, '2025-01-01', ?3, ?4);";

    assert!(conn.execute(insert, params!["  ", 30, 1, 1]).is_err());
    assert!(conn.execute(insert, params!["title", 0, 1, 1]).is_err());
    assert!(conn.execute(insert, params!["title", 1441, 1, 1]).is_err());
    assert!(conn.execute(insert, params!["title", 30, 5, 4]).is_err());
    assert_eq!(conn.execute(insert, params!["title", 30, 5, 5]).unwrap(), 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object_exists(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object_exists(conn, "index", index_name);
}

fn assert_schema_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
