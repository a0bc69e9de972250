#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::{Transaction, TransactionBehavior, params};
use serde_json::{Value, json};

impl SqliteStore {
    /// Renames a user project and rebuilds the paths of its subtree.
    pub fn rename_project(
        &mut self,
        request: RenameProjectRequest,
    ) -> Result<ProjectRow, StoreError> {
        let name = canonicalize_name(&request.name)?;
        let payload = json!({ "name": name.as_str() });
        self.update_project(
            &request.owner_id,
            &request.project_id,
            "project_renamed",
            payload,
            |tx, owner, node, now_ms| {
                if node.is_system {
                    return Err(StoreError::InvalidOperation(
                        "system projects cannot be renamed",
                    ));
                }
                tx.execute(
                    "UPDATE projects SET name=?2, updated_at_ms=?3 WHERE id=?1",
                    params![node.id, name.as_str(), now_ms],
                )?;
                rebuild_paths_tx(tx, owner)?;
                Ok(())
            },
        )
    }

    pub fn set_project_color(
        &mut self,
        request: SetProjectColorRequest,
    ) -> Result<ProjectRow, StoreError> {
        let color = canonicalize_color(request.color.as_deref())?;
        let payload = json!({ "color": color });
        self.update_project(
            &request.owner_id,
            &request.project_id,
            "project_color_set",
            payload,
            |tx, _, node, now_ms| {
                tx.execute(
                    "UPDATE projects SET color=?2, updated_at_ms=?3 WHERE id=?1",
                    params![node.id, color, now_ms],
                )?;
                Ok(())
            },
        )
    }

    pub fn set_project_completed(
        &mut self,
        request: SetProjectCompletedRequest,
    ) -> Result<ProjectRow, StoreError> {
        let completed = request.completed;
        self.update_project(
            &request.owner_id,
            &request.project_id,
            "project_completed_set",
            json!({ "completed": completed }),
            |tx, _, node, now_ms| {
                tx.execute(
                    "UPDATE projects SET is_completed=?2, updated_at_ms=?3 WHERE id=?1",
                    params![node.id, completed as i64, now_ms],
                )?;
                Ok(())
            },
        )
    }

    /// Attribute updates never touch keys; they share lookup, ownership check and journaling.
    fn update_project(
        &mut self,
        owner_id: &str,
        project_id: &str,
        event_type: &'static str,
        payload: Value,
        apply: impl FnOnce(&Transaction<'_>, &OwnerId, &LiveNode, i64) -> Result<(), StoreError>,
    ) -> Result<ProjectRow, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let project_id = canonicalize_project_ref(&owner, project_id)?;
        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let node = require_live_node_tx(&tx, &project_id)?;
        node.ensure_owner(&owner)?;
        apply(&tx, &owner, &node, now_ms)?;

        append_event_tx(
            &tx,
            journal,
            ProjectEvent {
                owner: &owner,
                ts_ms: now_ms,
                project_id: Some(project_id.as_str()),
                event_type,
                payload,
            },
        )?;
        let row = live_project_tx(&tx, &project_id)?.ok_or(StoreError::NodeNotFound)?;
        tx.commit()?;

        tracing::debug!(
            owner = owner.as_str(),
            project_id = project_id.as_str(),
            event_type,
            "project updated"
        );
        Ok(row)
    }
}
