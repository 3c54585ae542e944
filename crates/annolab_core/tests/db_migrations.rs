use annolab_core::db::migrations::latest_version;
use annolab_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn document_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(documents);").unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap();
    names.map(Result::unwrap).collect()
}

fn index_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'documents';")
        .unwrap();
    let names = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
    names.map(Result::unwrap).collect()
}

#[test]
fn fresh_database_has_document_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(
        document_columns(&conn),
        ["key", "body", "revision", "created_at", "updated_at"]
    );
    assert!(index_names(&conn)
        .iter()
        .any(|name| name == "idx_documents_updated_at"));
}

#[test]
fn inserted_rows_start_at_revision_one_with_millisecond_timestamps() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (key, body) VALUES ('fresh', '{}');",
        [],
    )
    .unwrap();

    let (revision, created_at, updated_at): (u32, i64, i64) = conn
        .query_row(
            "SELECT revision, created_at, updated_at FROM documents WHERE key = 'fresh';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();

    assert_eq!(revision, 1);
    let now = chrono::Utc::now().timestamp_millis();
    assert!((now - created_at).abs() < 60_000, "created_at={created_at}");
    assert!(updated_at >= created_at);
}

#[test]
fn revision_below_one_violates_check() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO documents (key, body, revision) VALUES ('zero', '{}', 0);",
        [],
    );
    assert!(result.is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn stored_documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("documents.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO documents (key, body) VALUES ('kept', '{\"a\":1}');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(user_version(&second), latest_version());
    let body: String = second
        .query_row("SELECT body FROM documents WHERE key = 'kept';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(body, "{\"a\":1}");
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newer.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}
