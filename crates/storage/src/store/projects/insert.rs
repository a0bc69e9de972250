#![forbid(unsafe_code)]

use super::super::*;
use pf_core::keys::leaf_slot;
use rusqlite::TransactionBehavior;
use serde_json::json;

impl SqliteStore {
    /// Inserts a leaf as the last child of `parent_id`, or of the owner's root when no parent is
    /// given. The root is created first if the owner has no forest yet.
    pub fn insert_project(
        &mut self,
        request: InsertProjectRequest,
    ) -> Result<ProjectRow, StoreError> {
        let owner = canonicalize_owner(&request.owner_id)?;
        let project_id = canonicalize_project(&request.project_id)?;
        let parent_id = request
            .parent_id
            .as_deref()
            .map(|value| canonicalize_project_ref(&owner, value))
            .transpose()?;
        let name = canonicalize_name(&request.name)?;
        let color = canonicalize_color(request.color.as_deref())?;

        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let root = ensure_root_tx(&tx, &owner, now_ms, journal)?;
        let parent = match parent_id {
            Some(parent_id) => {
                let parent = require_live_node_tx(&tx, &parent_id)?;
                parent.ensure_owner(&owner)?;
                parent
            }
            None => root,
        };

        let slot = leaf_slot(parent.range);
        insert_node_tx(
            &tx,
            NewNode {
                id: &project_id,
                owner: &owner,
                slot,
                name: name.as_str(),
                color: color.as_deref(),
                is_system: false,
                now_ms,
            },
        )?;
        rebuild_paths_tx(&tx, &owner)?;

        append_event_tx(
            &tx,
            journal,
            ProjectEvent {
                owner: &owner,
                ts_ms: now_ms,
                project_id: Some(project_id.as_str()),
                event_type: "project_inserted",
                payload: json!({
                    "parent_id": parent.id,
                    "name": name.as_str(),
                    "left": slot.left(),
                    "right": slot.right(),
                }),
            },
        )?;

        let row = live_project_tx(&tx, &project_id)?.ok_or(StoreError::NodeNotFound)?;
        tx.commit()?;

        tracing::info!(
            owner = owner.as_str(),
            project_id = project_id.as_str(),
            parent_id = %parent.id,
            left = row.left_key,
            right = row.right_key,
            "project inserted"
        );
        Ok(row)
    }
}
