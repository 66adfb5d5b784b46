use rusqlite::Connection;
use taskminder_core::db::migrations::{apply_migrations, latest_version, schema_version};
use taskminder_core::db::{open_db, open_db_in_memory, DbError};
use taskminder_core::{KeyValueStore, SqliteKeyValueStore};

#[test]
fn fresh_database_is_migrated_and_usable_as_kv_store() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());

    let mut kv = SqliteKeyValueStore::new(&conn);
    kv.put("eq_tasks", "[]").unwrap();
    assert_eq!(kv.get("eq_tasks").unwrap().as_deref(), Some("[]"));
}

#[test]
fn migrating_an_up_to_date_database_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteKeyValueStore::new(&conn).put("eq_settings", "{}").unwrap();

    assert_eq!(apply_migrations(&mut conn).unwrap(), latest_version());
    assert_eq!(
        SqliteKeyValueStore::new(&conn).get("eq_settings").unwrap().as_deref(),
        Some("{}")
    );
}

#[test]
fn stored_values_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskminder.db");

    {
        let conn = open_db(&path).unwrap();
        SqliteKeyValueStore::new(&conn).put("eq_tasks", "[1]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_eq!(
        SqliteKeyValueStore::new(&conn).get("eq_tasks").unwrap().as_deref(),
        Some("[1]")
    );
}

#[test]
fn database_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 42);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}
