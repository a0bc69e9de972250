#![forbid(unsafe_code)]

use pf_storage::{InsertProjectRequest, MoveProjectRequest, SqliteStore, StoreConfig, StoreError};
use rusqlite::{Connection, OpenFlags, params};
use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;

const OWNER: &str = "owner_1";

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("pf_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn insert_request(id: &str) -> InsertProjectRequest {
    InsertProjectRequest {
        owner_id: OWNER.to_string(),
        project_id: id.to_string(),
        parent_id: None,
        name: id.to_uppercase(),
        color: None,
    }
}

fn busy() -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        None,
    )
}

#[test]
fn reopen_keeps_committed_forest() {
    let storage_dir = temp_dir("reopen_keeps_committed_forest");
    {
        let mut store = SqliteStore::open(&storage_dir).expect("open store");
        store.insert_project(insert_request("a")).expect("insert a");
        store.insert_project(insert_request("b")).expect("insert b");
    }

    let store = SqliteStore::open(&storage_dir).expect("reopen store");
    assert_eq!(store.db_path(), storage_dir.join("projforest.db"));
    assert_eq!(store.count_projects(OWNER).expect("count"), 3);
    store.verify_forest(OWNER).expect("forest valid");
}

#[test]
fn read_only_file_is_a_capability_error() {
    let storage_dir = temp_dir("read_only_file_is_a_capability_error");
    let db_path = storage_dir.join("projforest.db");
    std::fs::File::create(&db_path).expect("create empty database file");

    let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .expect("open read-only");
    let err = SqliteStore::from_connection(conn, StoreConfig::new(&storage_dir))
        .expect_err("read-only connection must be refused");
    assert!(matches!(err, StoreError::StoreCapabilityError(_)), "{err:?}");
    assert_eq!(err.code(), "STORE_CAPABILITY");
}

#[test]
fn query_only_connection_is_a_capability_error() {
    let conn = Connection::open_in_memory().expect("open memory db");
    conn.execute_batch("PRAGMA query_only = ON;")
        .expect("enable query_only");
    let err = SqliteStore::from_connection(conn, StoreConfig::new(":memory:"))
        .expect_err("query_only connection must be refused");
    assert!(matches!(err, StoreError::StoreCapabilityError(_)), "{err:?}");
}

#[test]
fn foreign_tables_require_reset() {
    let storage_dir = temp_dir("foreign_tables_require_reset");
    {
        let conn = Connection::open(storage_dir.join("projforest.db")).expect("open db");
        conn.execute_batch("CREATE TABLE tasks(id TEXT PRIMARY KEY);")
            .expect("create legacy table");
    }

    let err = SqliteStore::open(&storage_dir).expect_err("legacy db must be refused");
    assert_eq!(err.code(), "RESET_REQUIRED");
}

#[test]
fn schema_version_mismatch_requires_reset() {
    let storage_dir = temp_dir("schema_version_mismatch_requires_reset");
    drop(SqliteStore::open(&storage_dir).expect("open store"));
    {
        let conn = Connection::open(storage_dir.join("projforest.db")).expect("open db");
        conn.execute(
            "UPDATE store_state SET schema_version=?1 WHERE singleton=1",
            params![99i64],
        )
        .expect("bump schema version");
    }

    let err = SqliteStore::open(&storage_dir).expect_err("future schema must be refused");
    assert_eq!(err.code(), "RESET_REQUIRED");
}

#[test]
fn held_write_lock_aborts_mutation_and_leaves_store_usable() {
    let storage_dir = temp_dir("held_write_lock_aborts_mutation");
    let mut config = StoreConfig::new(&storage_dir);
    config.busy_timeout = Duration::from_millis(50);
    config.max_retries = 0;
    let mut store = SqliteStore::open_with(config).expect("open store");
    store.insert_project(insert_request("a")).expect("insert a");

    let blocker = Connection::open(store.db_path()).expect("open second connection");
    blocker
        .execute_batch("BEGIN IMMEDIATE;")
        .expect("take write lock");

    let err = store
        .with_retry(|store| store.insert_project(insert_request("b")))
        .expect_err("write lock is held");
    assert!(err.is_retryable(), "{err:?}");
    assert_eq!(err.code(), "TRANSACTION_ABORTED");

    blocker.execute_batch("ROLLBACK;").expect("release write lock");
    store.insert_project(insert_request("b")).expect("insert b");
    assert_eq!(store.count_projects(OWNER).expect("count"), 3);
    store.verify_forest(OWNER).expect("forest valid");
}

#[test]
fn with_retry_reruns_aborted_operations_only() {
    let mut store = SqliteStore::open_in_memory().expect("open store");

    let attempts = Cell::new(0u32);
    let value = store
        .with_retry(|_| {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 3 {
                Err(StoreError::from(busy()))
            } else {
                Ok(7)
            }
        })
        .expect("third attempt succeeds");
    assert_eq!((value, attempts.get()), (7, 3));

    attempts.set(0);
    let err = store
        .with_retry(|store| {
            attempts.set(attempts.get() + 1);
            store.move_last_child_of(MoveProjectRequest {
                owner_id: OWNER.to_string(),
                project_id: "missing".to_string(),
                target_id: "also_missing".to_string(),
            })
        })
        .expect_err("not found is not retried");
    assert!(matches!(err, StoreError::NodeNotFound), "{err:?}");
    assert_eq!(attempts.get(), 1);
}

#[test]
fn journal_records_committed_mutations_only() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    store.insert_project(insert_request("a")).expect("insert a");
    store.insert_project(insert_request("b")).expect("insert b");
    store
        .move_left_of(MoveProjectRequest {
            owner_id: OWNER.to_string(),
            project_id: "b".to_string(),
            target_id: "a".to_string(),
        })
        .expect("move b first");
    store
        .insert_project(insert_request("a"))
        .expect_err("duplicate insert");

    let events = store.list_project_events(OWNER, 10).expect("events");
    let types = events
        .iter()
        .map(|event| event.event_type.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            "project_moved",
            "project_inserted",
            "project_inserted",
            "root_created"
        ]
    );
    assert_eq!(events[0].project_id.as_deref(), Some("b"));
    assert_eq!(events[0].payload["mode"], "left_of");
    assert_eq!(events[0].payload["to"]["left"], 2);
    assert!(events[0].event_id().starts_with("pev_"));

    let latest = store.list_project_events(OWNER, 1).expect("latest event");
    assert_eq!(latest.len(), 1);
}

#[test]
fn disabled_journal_writes_no_events() {
    let storage_dir = temp_dir("disabled_journal_writes_no_events");
    let mut config = StoreConfig::new(&storage_dir);
    config.journal = false;
    let mut store = SqliteStore::open_with(config).expect("open store");
    store.insert_project(insert_request("a")).expect("insert a");

    assert!(store.list_project_events(OWNER, 10).expect("events").is_empty());
    assert_eq!(store.rebuild_paths(OWNER).expect("rebuild"), 0);
}

#[test]
fn rebuild_paths_repairs_stale_labels() {
    let storage_dir = temp_dir("rebuild_paths_repairs_stale_labels");
    {
        let mut store = SqliteStore::open(&storage_dir).expect("open store");
        store.insert_project(insert_request("a")).expect("insert a");
    }
    {
        let conn = Connection::open(storage_dir.join("projforest.db")).expect("open db");
        conn.execute(
            "UPDATE projects SET path='/stale', level=9 WHERE id='a'",
            [],
        )
        .expect("corrupt labels");
    }

    let mut store = SqliteStore::open(&storage_dir).expect("reopen store");
    let err = store.verify_forest(OWNER).expect_err("stale labels detected");
    assert_eq!(err.code(), "CORRUPT_FOREST");

    assert_eq!(store.rebuild_paths(OWNER).expect("rebuild"), 1);
    store.verify_forest(OWNER).expect("forest valid after rebuild");
    let a = store
        .find_project(OWNER, "a")
        .expect("find")
        .expect("a exists");
    assert_eq!((a.path.as_str(), a.level), ("/root/A", 2));
}
