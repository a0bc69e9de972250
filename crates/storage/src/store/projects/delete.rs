#![forbid(unsafe_code)]

use super::super::*;
use pf_core::forest::ForestViolation;
use pf_core::keys::close_gap;
use rusqlite::{TransactionBehavior, params};
use serde_json::json;

impl SqliteStore {
    /// Removes the subtree rooted at `project_id` and closes the gap it leaves.
    ///
    /// With `force` the rows are deleted; without it they are stamped with `deleted_at_ms` and keep
    /// their keys, invisible to every live query. System projects require `force`. Returns the
    /// number of removed projects.
    pub fn delete_subtree(&mut self, request: DeleteSubtreeRequest) -> Result<usize, StoreError> {
        let owner = canonicalize_owner(&request.owner_id)?;
        let project_id = canonicalize_project_ref(&owner, &request.project_id)?;

        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let node = require_live_node_tx(&tx, &project_id)?;
        node.ensure_owner(&owner)?;
        if node.is_system && !request.force {
            return Err(StoreError::InvalidOperation(
                "system projects can only be deleted with force",
            ));
        }

        let range = node.range;
        let removed = if request.force {
            tx.execute(
                "DELETE FROM projects \
                 WHERE owner=?1 AND deleted_at_ms IS NULL AND lft >= ?2 AND rgt <= ?3",
                params![owner.as_str(), range.left(), range.right()],
            )?
        } else {
            tx.execute(
                "UPDATE projects SET deleted_at_ms=?4, updated_at_ms=?4 \
                 WHERE owner=?1 AND deleted_at_ms IS NULL AND lft >= ?2 AND rgt <= ?3",
                params![owner.as_str(), range.left(), range.right(), now_ms],
            )?
        };
        if removed as i64 != range.node_count() {
            return Err(StoreError::CorruptForest(
                ForestViolation::SubtreeCountMismatch {
                    left: range.left(),
                    expected: range.node_count(),
                    found: removed as i64,
                },
            ));
        }

        let closed = apply_shift_tx(&tx, &owner, close_gap(range))?;
        rebuild_paths_tx(&tx, &owner)?;

        append_event_tx(
            &tx,
            journal,
            ProjectEvent {
                owner: &owner,
                ts_ms: now_ms,
                project_id: Some(project_id.as_str()),
                event_type: "subtree_deleted",
                payload: json!({
                    "force": request.force,
                    "removed": removed,
                    "left": range.left(),
                    "right": range.right(),
                }),
            },
        )?;
        tx.commit()?;

        tracing::info!(
            owner = owner.as_str(),
            project_id = project_id.as_str(),
            force = request.force,
            removed,
            closed,
            "subtree deleted"
        );
        Ok(removed)
    }
}
