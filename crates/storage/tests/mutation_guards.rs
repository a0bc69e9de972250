#![forbid(unsafe_code)]

use pf_storage::{
    DeleteSubtreeRequest, InsertProjectRequest, ListProjectsRequest, MoveProjectRequest,
    RenameProjectRequest, SetProjectColorRequest, SetProjectCompletedRequest, SqliteStore,
    StoreError,
};

const OWNER: &str = "owner_1";
const ROOT_ID: &str = "sys:owner_1:root";

fn insert_for(store: &mut SqliteStore, owner: &str, id: &str, parent: Option<&str>) {
    store
        .insert_project(InsertProjectRequest {
            owner_id: owner.to_string(),
            project_id: id.to_string(),
            parent_id: parent.map(str::to_string),
            name: id.to_uppercase(),
            color: None,
        })
        .expect("insert project");
}

fn layout(store: &SqliteStore) -> Vec<(String, i64, i64, String)> {
    store
        .list_projects(ListProjectsRequest {
            owner_id: OWNER.to_string(),
            include_system: true,
        })
        .expect("list projects")
        .into_iter()
        .map(|row| (row.id, row.left_key, row.right_key, row.path))
        .collect()
}

fn seeded() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    insert_for(&mut store, OWNER, "a", None);
    insert_for(&mut store, OWNER, "a1", Some("a"));
    insert_for(&mut store, OWNER, "b", None);
    store
}

fn move_err(
    store: &mut SqliteStore,
    id: &str,
    target: &str,
    last_child: bool,
) -> StoreError {
    let request = MoveProjectRequest {
        owner_id: OWNER.to_string(),
        project_id: id.to_string(),
        target_id: target.to_string(),
    };
    let result = if last_child {
        store.move_last_child_of(request)
    } else {
        store.move_left_of(request)
    };
    result.expect_err("move must fail")
}

#[test]
fn move_into_own_subtree_is_rejected_without_changes() {
    let mut store = seeded();
    let before = layout(&store);

    let err = move_err(&mut store, "a", "a1", true);
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");
    let err = move_err(&mut store, "a", "a", true);
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");
    let err = move_err(&mut store, "a", "a1", false);
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");

    assert_eq!(layout(&store), before);
}

#[test]
fn root_cannot_move_and_nothing_goes_beside_it() {
    let mut store = seeded();
    let before = layout(&store);

    let err = move_err(&mut store, ROOT_ID, "b", true);
    assert_eq!(err.code(), "INVALID_OPERATION");
    let err = move_err(&mut store, "b", ROOT_ID, false);
    assert_eq!(err.code(), "INVALID_OPERATION");

    assert_eq!(layout(&store), before);
}

#[test]
fn cross_owner_move_is_rejected() {
    let mut store = seeded();
    insert_for(&mut store, "owner_2", "z", None);
    let before = layout(&store);

    let err = move_err(&mut store, "a", "z", true);
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");

    let err = store
        .move_last_child_of(MoveProjectRequest {
            owner_id: "owner_2".to_string(),
            project_id: "z".to_string(),
            target_id: "b".to_string(),
        })
        .expect_err("target of another owner");
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");

    let err = store
        .insert_project(InsertProjectRequest {
            owner_id: "owner_2".to_string(),
            project_id: "z1".to_string(),
            parent_id: Some("a".to_string()),
            name: "Z1".to_string(),
            color: None,
        })
        .expect_err("parent of another owner");
    assert!(matches!(err, StoreError::InvalidOperation(_)), "{err:?}");

    assert_eq!(layout(&store), before);
    store.verify_forest("owner_2").expect("forest valid");
}

#[test]
fn unknown_ids_report_not_found_and_change_nothing() {
    let mut store = seeded();
    let before = layout(&store);

    let err = move_err(&mut store, "missing", "b", true);
    assert!(matches!(err, StoreError::NodeNotFound), "{err:?}");
    let err = move_err(&mut store, "a", "missing", false);
    assert!(matches!(err, StoreError::NodeNotFound), "{err:?}");

    let err = store
        .delete_subtree(DeleteSubtreeRequest {
            owner_id: OWNER.to_string(),
            project_id: "missing".to_string(),
            force: true,
        })
        .expect_err("delete unknown");
    assert_eq!(err.code(), "NODE_NOT_FOUND");

    let err = store
        .insert_project(InsertProjectRequest {
            owner_id: OWNER.to_string(),
            project_id: "c".to_string(),
            parent_id: Some("missing".to_string()),
            name: "C".to_string(),
            color: None,
        })
        .expect_err("insert under unknown parent");
    assert_eq!(err.code(), "NODE_NOT_FOUND");

    assert_eq!(layout(&store), before);
}

#[test]
fn duplicate_id_rolls_back_the_opened_gap() {
    let mut store = seeded();
    let before = layout(&store);

    let err = store
        .insert_project(InsertProjectRequest {
            owner_id: OWNER.to_string(),
            project_id: "a1".to_string(),
            parent_id: Some("b".to_string()),
            name: "Again".to_string(),
            color: None,
        })
        .expect_err("duplicate id");
    assert!(matches!(err, StoreError::DuplicateRecord), "{err:?}");

    assert_eq!(layout(&store), before);
    store.verify_forest(OWNER).expect("forest valid");
}

#[test]
fn malformed_input_is_rejected_before_any_write() {
    let mut store = seeded();
    let before = layout(&store);

    for (owner, id, name) in [
        ("", "c", "C"),
        ("owner 1", "c", "C"),
        (OWNER, "", "C"),
        (OWNER, "sys:owner_1:extra", "C"),
        (OWNER, "c", "   "),
        (OWNER, "c", "a/b"),
    ] {
        let err = store
            .insert_project(InsertProjectRequest {
                owner_id: owner.to_string(),
                project_id: id.to_string(),
                parent_id: None,
                name: name.to_string(),
                color: None,
            })
            .expect_err("malformed input");
        assert_eq!(err.code(), "INVALID_INPUT", "{owner:?} {id:?} {name:?}");
    }

    assert_eq!(layout(&store), before);
}

#[test]
fn system_projects_are_protected() {
    let mut store = seeded();
    let archive = store.ensure_archive(OWNER).expect("archive");

    let err = store
        .delete_subtree(DeleteSubtreeRequest {
            owner_id: OWNER.to_string(),
            project_id: archive.id.clone(),
            force: false,
        })
        .expect_err("soft delete of archive");
    assert_eq!(err.code(), "INVALID_OPERATION");

    let err = store
        .rename_project(RenameProjectRequest {
            owner_id: OWNER.to_string(),
            project_id: ROOT_ID.to_string(),
            name: "top".to_string(),
        })
        .expect_err("rename root");
    assert_eq!(err.code(), "INVALID_OPERATION");

    let removed = store
        .delete_subtree(DeleteSubtreeRequest {
            owner_id: OWNER.to_string(),
            project_id: archive.id,
            force: true,
        })
        .expect("forced archive delete");
    assert_eq!(removed, 1);
    store.verify_forest(OWNER).expect("forest valid");
}

#[test]
fn rename_rewrites_descendant_paths() {
    let mut store = seeded();
    insert_for(&mut store, OWNER, "a1x", Some("a1"));

    let renamed = store
        .rename_project(RenameProjectRequest {
            owner_id: OWNER.to_string(),
            project_id: "a".to_string(),
            name: "  Alpha ".to_string(),
        })
        .expect("rename");
    assert_eq!(renamed.name, "Alpha");
    assert_eq!(renamed.path, "/root/Alpha");

    let leaf = store
        .find_project(OWNER, "a1x")
        .expect("find")
        .expect("leaf exists");
    assert_eq!(leaf.path, "/root/Alpha/A1/A1X");

    let found = store
        .find_project_by_name(OWNER, "Alpha")
        .expect("find by name")
        .expect("renamed project exists");
    assert_eq!(found.id, "a");
    store.verify_forest(OWNER).expect("forest valid");
}

#[test]
fn attribute_setters_leave_keys_alone() {
    let mut store = seeded();
    let before = layout(&store);

    let colored = store
        .set_project_color(SetProjectColorRequest {
            owner_id: OWNER.to_string(),
            project_id: "b".to_string(),
            color: Some("#ff8800".to_string()),
        })
        .expect("set color");
    assert_eq!(colored.color.as_deref(), Some("#ff8800"));

    let cleared = store
        .set_project_color(SetProjectColorRequest {
            owner_id: OWNER.to_string(),
            project_id: "b".to_string(),
            color: Some("  ".to_string()),
        })
        .expect("clear color");
    assert_eq!(cleared.color, None);

    let done = store
        .set_project_completed(SetProjectCompletedRequest {
            owner_id: OWNER.to_string(),
            project_id: "a1".to_string(),
            completed: true,
        })
        .expect("complete");
    assert!(done.is_completed);

    let err = store
        .set_project_completed(SetProjectCompletedRequest {
            owner_id: "owner_2".to_string(),
            project_id: "a1".to_string(),
            completed: false,
        })
        .expect_err("other owner");
    assert_eq!(err.code(), "INVALID_OPERATION");

    assert_eq!(layout(&store), before);
}
