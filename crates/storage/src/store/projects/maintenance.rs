#![forbid(unsafe_code)]

use super::super::*;
use pf_core::forest::{ForestNodeView, check_forest};
use rusqlite::TransactionBehavior;
use serde_json::json;

impl SqliteStore {
    /// Recomputes every `path` and `level` of the owner's forest from the stored keys.
    /// Returns how many rows were rewritten.
    pub fn rebuild_paths(&mut self, owner_id: &str) -> Result<usize, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = rebuild_paths_tx(&tx, &owner)?;
        if updated > 0 {
            append_event_tx(
                &tx,
                journal,
                ProjectEvent {
                    owner: &owner,
                    ts_ms: now_ms,
                    project_id: None,
                    event_type: "paths_rebuilt",
                    payload: json!({ "updated": updated }),
                },
            )?;
        }
        tx.commit()?;

        if updated > 0 {
            tracing::warn!(owner = owner.as_str(), updated, "stale project paths repaired");
        }
        Ok(updated)
    }

    /// Checks the owner's live forest: a single root at `[1, 2n]`, properly nested intervals and
    /// labels that match the key ancestry.
    pub fn verify_forest(&self, owner_id: &str) -> Result<(), StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let rows = live_projects_tx(&self.conn, &owner)?;
        let mut views = Vec::with_capacity(rows.len());
        for row in &rows {
            views.push(ForestNodeView {
                range: row_range(row.left_key, row.right_key)?,
                name: &row.name,
                level: row.level,
                path: &row.path,
            });
        }
        check_forest(&views).map_err(|violation| {
            tracing::error!(owner = owner.as_str(), %violation, "project forest is corrupt");
            StoreError::CorruptForest(violation)
        })
    }
}
