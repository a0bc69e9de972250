#![forbid(unsafe_code)]

use super::super::*;
use pf_core::forest::ForestViolation;
use pf_core::keys::{MovePlan, lift_offset};
use rusqlite::{Transaction, TransactionBehavior};
use serde_json::json;

impl SqliteStore {
    pub fn move_last_child_of(
        &mut self,
        request: MoveProjectRequest,
    ) -> Result<ProjectRow, StoreError> {
        self.move_project(request, MoveMode::LastChildOf)
    }

    pub fn move_left_of(&mut self, request: MoveProjectRequest) -> Result<ProjectRow, StoreError> {
        self.move_project(request, MoveMode::LeftOf)
    }

    /// Relocates the subtree rooted at `project_id` relative to `target_id`.
    ///
    /// Keys are rewritten by three bulk shifts inside one immediate transaction; any failure rolls
    /// back every phase.
    pub fn move_project(
        &mut self,
        request: MoveProjectRequest,
        mode: MoveMode,
    ) -> Result<ProjectRow, StoreError> {
        let owner = canonicalize_owner(&request.owner_id)?;
        let project_id = canonicalize_project_ref(&owner, &request.project_id)?;
        let target_id = canonicalize_project_ref(&owner, &request.target_id)?;

        let journal = self.config.journal;
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let node = require_live_node_tx(&tx, &project_id)?;
        let target = require_live_node_tx(&tx, &target_id)?;
        node.ensure_owner(&owner)?;
        if target.owner != node.owner {
            return Err(StoreError::InvalidOperation(
                "target belongs to another owner",
            ));
        }

        let offset = lift_offset(max_key_tx(&tx, &owner)?);
        let plan = MovePlan::new(node.range, target.range, mode, offset)
            .map_err(|err| StoreError::InvalidOperation(err.message()))?;

        lift_out_tx(&tx, &owner, &plan)?;
        compact_tx(&tx, &owner, &plan)?;
        reinsert_tx(&tx, &owner, &plan)?;
        rebuild_paths_tx(&tx, &owner)?;

        let row = live_project_tx(&tx, &project_id)?.ok_or(StoreError::NodeNotFound)?;
        if row.left_key != plan.destination.left() || row.right_key != plan.destination.right() {
            return Err(StoreError::CorruptForest(ForestViolation::MisplacedSubtree {
                expected: plan.destination,
                left: row.left_key,
                right: row.right_key,
            }));
        }

        append_event_tx(
            &tx,
            journal,
            ProjectEvent {
                owner: &owner,
                ts_ms: now_ms,
                project_id: Some(project_id.as_str()),
                event_type: "project_moved",
                payload: json!({
                    "mode": mode.as_str(),
                    "target_id": target.id,
                    "from": { "left": node.range.left(), "right": node.range.right() },
                    "to": { "left": row.left_key, "right": row.right_key },
                }),
            },
        )?;
        tx.commit()?;

        tracing::info!(
            owner = owner.as_str(),
            project_id = project_id.as_str(),
            target_id = %target.id,
            mode = mode.as_str(),
            from = %node.range,
            to = %plan.destination,
            "project moved"
        );
        Ok(row)
    }
}

/// Parks the subtree above every live key.
fn lift_out_tx(tx: &Transaction<'_>, owner: &OwnerId, plan: &MovePlan) -> Result<usize, StoreError> {
    let shifted = apply_shift_tx(tx, owner, plan.lift)?;
    tracing::debug!(owner = owner.as_str(), shifted, offset = plan.lift.delta, "lift out");
    Ok(shifted)
}

/// Slides the keys between origin and destination over the span the subtree left.
fn compact_tx(tx: &Transaction<'_>, owner: &OwnerId, plan: &MovePlan) -> Result<usize, StoreError> {
    let Some(shift) = plan.compact else {
        return Ok(0);
    };
    let shifted = apply_shift_tx(tx, owner, shift)?;
    tracing::debug!(owner = owner.as_str(), shifted, delta = shift.delta, "compact");
    Ok(shifted)
}

fn reinsert_tx(tx: &Transaction<'_>, owner: &OwnerId, plan: &MovePlan) -> Result<usize, StoreError> {
    let shifted = apply_shift_tx(tx, owner, plan.reinsert)?;
    tracing::debug!(
        owner = owner.as_str(),
        shifted,
        left = plan.destination.left(),
        "reinsert"
    );
    Ok(shifted)
}
