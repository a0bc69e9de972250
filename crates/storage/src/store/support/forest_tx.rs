#![forbid(unsafe_code)]

use super::super::{ProjectRow, StoreError, map_insert_conflict};
use super::events_tx::{ProjectEvent, append_event_tx};
use super::range_tx::apply_shift_tx;
use pf_core::ROOT_NAME;
use pf_core::forest::ForestViolation;
use pf_core::ids::{OwnerId, ProjectId, SystemProject};
use pf_core::keys::{KeyRange, open_gap};
use pf_core::paths::{PathEntry, derive_paths};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use serde_json::json;

const PROJECT_COLUMNS: &str = "id, owner, lft, rgt, name, color, is_completed, level, path, \
                               is_system, created_at_ms, updated_at_ms";

/// Key state of one live project, as read inside the current transaction.
#[derive(Clone, Debug)]
pub(in crate::store) struct LiveNode {
    pub(in crate::store) id: String,
    pub(in crate::store) owner: String,
    pub(in crate::store) range: KeyRange,
    pub(in crate::store) is_system: bool,
}

impl LiveNode {
    pub(in crate::store) fn ensure_owner(&self, owner: &OwnerId) -> Result<(), StoreError> {
        if self.owner == owner.as_str() {
            Ok(())
        } else {
            Err(StoreError::InvalidOperation(
                "project belongs to another owner",
            ))
        }
    }
}

pub(in crate::store) struct NewNode<'a> {
    pub(in crate::store) id: &'a ProjectId,
    pub(in crate::store) owner: &'a OwnerId,
    pub(in crate::store) slot: KeyRange,
    pub(in crate::store) name: &'a str,
    pub(in crate::store) color: Option<&'a str>,
    pub(in crate::store) is_system: bool,
    pub(in crate::store) now_ms: i64,
}

pub(in crate::store) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        left_key: row.get(2)?,
        right_key: row.get(3)?,
        name: row.get(4)?,
        color: row.get(5)?,
        is_completed: row.get::<_, i64>(6)? != 0,
        level: row.get(7)?,
        path: row.get(8)?,
        is_system: row.get::<_, i64>(9)? != 0,
        created_at_ms: row.get(10)?,
        updated_at_ms: row.get(11)?,
    })
}

pub(in crate::store) fn row_range(left: i64, right: i64) -> Result<KeyRange, StoreError> {
    KeyRange::try_new(left, right)
        .map_err(|_| StoreError::CorruptForest(ForestViolation::InvalidInterval { left, right }))
}

pub(in crate::store) fn live_project_tx(
    conn: &Connection,
    id: &ProjectId,
) -> Result<Option<ProjectRow>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id=?1 AND deleted_at_ms IS NULL"),
            params![id.as_str()],
            project_from_row,
        )
        .optional()?)
}

pub(in crate::store) fn live_node_tx(
    conn: &Connection,
    id: &ProjectId,
) -> Result<Option<LiveNode>, StoreError> {
    let row = conn
        .query_row(
            "SELECT owner, lft, rgt, is_system FROM projects \
             WHERE id=?1 AND deleted_at_ms IS NULL",
            params![id.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)? != 0,
                ))
            },
        )
        .optional()?;

    match row {
        Some((owner, left, right, is_system)) => Ok(Some(LiveNode {
            id: id.as_str().to_string(),
            owner,
            range: row_range(left, right)?,
            is_system,
        })),
        None => Ok(None),
    }
}

pub(in crate::store) fn require_live_node_tx(
    conn: &Connection,
    id: &ProjectId,
) -> Result<LiveNode, StoreError> {
    live_node_tx(conn, id)?.ok_or(StoreError::NodeNotFound)
}

/// Every live project of the owner in left key order.
pub(in crate::store) fn live_projects_tx(
    conn: &Connection,
    owner: &OwnerId,
) -> Result<Vec<ProjectRow>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects \
         WHERE owner=?1 AND deleted_at_ms IS NULL \
         ORDER BY lft ASC"
    ))?;
    let mut rows = stmt.query(params![owner.as_str()])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(project_from_row(row)?);
    }
    Ok(out)
}

pub(in crate::store) fn max_key_tx(conn: &Connection, owner: &OwnerId) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(rgt), 0) FROM projects WHERE owner=?1 AND deleted_at_ms IS NULL",
        params![owner.as_str()],
        |row| row.get::<_, i64>(0),
    )?)
}

/// Returns the owner's root, creating `[1, 2]` when the owner has no live project yet.
pub(in crate::store) fn ensure_root_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    now_ms: i64,
    journal: bool,
) -> Result<LiveNode, StoreError> {
    let root_id = ProjectId::system(owner, SystemProject::Root);
    if let Some(root) = live_node_tx(tx, &root_id)? {
        return Ok(root);
    }

    let first_left = tx
        .query_row(
            "SELECT MIN(lft) FROM projects WHERE owner=?1 AND deleted_at_ms IS NULL",
            params![owner.as_str()],
            |row| row.get::<_, Option<i64>>(0),
        )?;
    if let Some(left) = first_left {
        return Err(StoreError::CorruptForest(ForestViolation::MissingRoot {
            left,
        }));
    }

    let range = KeyRange::root();
    tx.execute(
        "INSERT INTO projects(id, owner, lft, rgt, name, color, is_completed, level, path, \
                              is_system, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, 0, 1, ?6, 1, ?7, ?7)",
        params![
            root_id.as_str(),
            owner.as_str(),
            range.left(),
            range.right(),
            ROOT_NAME,
            format!("/{ROOT_NAME}"),
            now_ms,
        ],
    )
    .map_err(map_insert_conflict)?;

    append_event_tx(
        tx,
        journal,
        ProjectEvent {
            owner,
            ts_ms: now_ms,
            project_id: Some(root_id.as_str()),
            event_type: "root_created",
            payload: json!({ "left": range.left(), "right": range.right() }),
        },
    )?;
    tracing::debug!(owner = owner.as_str(), "root project created");

    Ok(LiveNode {
        id: root_id.into_string(),
        owner: owner.as_str().to_string(),
        range,
        is_system: true,
    })
}

/// Opens a gap at `slot.left()` and stores the row there.
///
/// Labels are written as placeholders; the caller rebuilds paths once the sequence is complete.
pub(in crate::store) fn insert_node_tx(
    tx: &Transaction<'_>,
    node: NewNode<'_>,
) -> Result<(), StoreError> {
    let gap = open_gap(node.slot.left(), node.slot.width());
    let shifted = apply_shift_tx(tx, node.owner, gap)?;
    tracing::debug!(
        owner = node.owner.as_str(),
        at = gap.from,
        width = gap.delta,
        shifted,
        "gap opened"
    );

    tx.execute(
        "INSERT INTO projects(id, owner, lft, rgt, name, color, is_completed, level, path, \
                              is_system, created_at_ms, updated_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, '', ?7, ?8, ?8)",
        params![
            node.id.as_str(),
            node.owner.as_str(),
            node.slot.left(),
            node.slot.right(),
            node.name,
            node.color,
            node.is_system as i64,
            node.now_ms,
        ],
    )
    .map_err(map_insert_conflict)?;
    Ok(())
}

/// Recomputes `path` and `level` for the owner's whole forest and writes the rows that changed.
pub(in crate::store) fn rebuild_paths_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
) -> Result<usize, StoreError> {
    let rows = live_projects_tx(tx, owner)?;
    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        entries.push(PathEntry {
            range: row_range(row.left_key, row.right_key)?,
            name: &row.name,
        });
    }

    let mut stmt = tx.prepare_cached("UPDATE projects SET path=?2, level=?3 WHERE id=?1")?;
    let mut updated = 0usize;
    for (row, derived) in rows.iter().zip(derive_paths(&entries)) {
        if row.path == derived.path && row.level == derived.level {
            continue;
        }
        updated += stmt.execute(params![row.id, derived.path, derived.level])?;
    }

    tracing::debug!(
        owner = owner.as_str(),
        nodes = rows.len(),
        updated,
        "paths rebuilt"
    );
    Ok(updated)
}
