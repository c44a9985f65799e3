use rusqlite::Connection;
use storegate_core::db::migrations::latest_version;
use storegate_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError, REQUIRED_TABLES};
use storegate_core::{ensure_schema_ready, StoreConfig};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in REQUIRED_TABLES {
        assert_table_exists(&conn, table);
    }
    ensure_schema_ready(&conn).unwrap();
}

#[test]
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO app_user (name) VALUES ('kept');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM app_user;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn open_db_with_config_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = StoreConfig {
        database_path: Some(path.clone()),
        busy_timeout_ms: 250,
        ..StoreConfig::default()
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);
    assert!(path.exists());
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
fn ensure_schema_ready_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = ensure_schema_ready(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn ensure_schema_ready_reports_missing_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE review;").unwrap();
    let err = ensure_schema_ready(&conn).unwrap_err();
    assert!(matches!(err, DbError::MissingRequiredTable("review")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
