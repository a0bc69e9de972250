#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use super::now_ms;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use std::collections::BTreeSet;

const SCHEMA_VERSION: i64 = 1;
const REQUIRED_TABLES: [&str; 3] = ["store_state", "projects", "project_events"];

/// Rejects databases that were not created by this store, or by another schema version.
pub(in crate::store) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = REQUIRED_TABLES.into_iter().collect();
    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }
    if required.iter().any(|table| !tables.contains(*table)) {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: required table is missing",
        ));
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

/// Structural mutations are conditional bulk UPDATEs; a connection that cannot take the write
/// lock can never run them.
pub(in crate::store) fn ensure_write_capability(conn: &mut Connection) -> Result<(), StoreError> {
    let query_only = conn.query_row("PRAGMA query_only", [], |row| row.get::<_, i64>(0))?;
    if query_only != 0 {
        return Err(StoreError::StoreCapabilityError(
            "connection is query_only; range updates are unavailable",
        ));
    }

    match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
        Ok(tx) => {
            tx.rollback()?;
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(code, _)) if code.code == ErrorCode::ReadOnly => Err(
            StoreError::StoreCapabilityError("database is read-only; range updates are unavailable"),
        ),
        Err(err) => Err(err.into()),
    }
}

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    write_schema(conn).map_err(|err| match err {
        rusqlite::Error::SqliteFailure(code, _) if code.code == ErrorCode::ReadOnly => {
            StoreError::StoreCapabilityError("database is read-only; range updates are unavailable")
        }
        other => other.into(),
    })
}

fn write_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&sql::full_schema_sql())?;

    let now_ms = now_ms();
    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}
