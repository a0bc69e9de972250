#![forbid(unsafe_code)]

//! Conditional bulk shifts of one key column.
//!
//! Each statement filters on the column it rewrites, so a left-key shift never changes which rows
//! a following right-key shift matches. Soft-deleted rows keep their frozen keys.

use super::super::StoreError;
use pf_core::ids::OwnerId;
use pf_core::keys::RangeShift;
use rusqlite::{Transaction, params};

/// Adds `delta` to `lft` for the owner's live rows with `threshold <= lft < max_key`.
pub(in crate::store) fn shift_left_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    threshold: i64,
    delta: i64,
    max_key: Option<i64>,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "UPDATE projects SET lft = lft + ?3 \
         WHERE owner=?1 AND deleted_at_ms IS NULL AND lft >= ?2 AND lft < ?4",
        params![owner.as_str(), threshold, delta, max_key.unwrap_or(i64::MAX)],
    )?)
}

/// Adds `delta` to `rgt` for the owner's live rows with `threshold <= rgt < max_key`.
pub(in crate::store) fn shift_right_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    threshold: i64,
    delta: i64,
    max_key: Option<i64>,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "UPDATE projects SET rgt = rgt + ?3 \
         WHERE owner=?1 AND deleted_at_ms IS NULL AND rgt >= ?2 AND rgt < ?4",
        params![owner.as_str(), threshold, delta, max_key.unwrap_or(i64::MAX)],
    )?)
}

/// Left column first, then right column. Returns the number of rewritten keys.
pub(in crate::store) fn apply_shift_tx(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    shift: RangeShift,
) -> Result<usize, StoreError> {
    if shift.is_noop() {
        return Ok(0);
    }
    let lefts = shift_left_tx(tx, owner, shift.from, shift.delta, shift.until)?;
    let rights = shift_right_tx(tx, owner, shift.from, shift.delta, shift.until)?;
    Ok(lefts + rights)
}
