#![forbid(unsafe_code)]

use super::super::*;
use pf_core::ARCHIVE_NAME;
use pf_core::keys::leaf_slot;
use rusqlite::TransactionBehavior;
use serde_json::json;

impl SqliteStore {
    /// Returns the owner's root, creating it when the owner has no live forest.
    pub fn ensure_root(&mut self, owner_id: &str) -> Result<ProjectRow, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let root = ensure_root_tx(&tx, &owner, now_ms, journal)?;
        let root_id = ProjectId::system(&owner, SystemProject::Root);
        let row = live_project_tx(&tx, &root_id)?.ok_or(StoreError::NodeNotFound)?;
        tx.commit()?;

        tracing::debug!(owner = owner.as_str(), root = %root.range, "root resolved");
        Ok(row)
    }

    /// Returns the owner's archive project, appending it under the root on first use.
    pub fn ensure_archive(&mut self, owner_id: &str) -> Result<ProjectRow, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let archive_id = ProjectId::system(&owner, SystemProject::Archive);
        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let root = ensure_root_tx(&tx, &owner, now_ms, journal)?;
        if let Some(row) = live_project_tx(&tx, &archive_id)? {
            tx.commit()?;
            return Ok(row);
        }

        let slot = leaf_slot(root.range);
        insert_node_tx(
            &tx,
            NewNode {
                id: &archive_id,
                owner: &owner,
                slot,
                name: ARCHIVE_NAME,
                color: None,
                is_system: true,
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
                project_id: Some(archive_id.as_str()),
                event_type: "archive_created",
                payload: json!({ "left": slot.left(), "right": slot.right() }),
            },
        )?;

        let row = live_project_tx(&tx, &archive_id)?.ok_or(StoreError::NodeNotFound)?;
        tx.commit()?;

        tracing::info!(owner = owner.as_str(), "archive project created");
        Ok(row)
    }
}
