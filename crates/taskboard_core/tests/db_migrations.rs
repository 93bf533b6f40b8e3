use rusqlite::Connection;
use taskboard_core::db::migrations::latest_version;
use taskboard_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_creates_kv_store() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn reopening_board_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('kanbanTheme', 'false');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let value: String = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = 'kanbanTheme';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "false");
}

#[test]
fn kv_store_stamps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('k', 'v');",
        [],
    )
    .unwrap();

    let updated_at: i64 = conn
        .query_row("SELECT updated_at FROM kv_store WHERE key = 'k';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert!(updated_at > 0);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
