#![forbid(unsafe_code)]

use super::super::{ProjectEventRow, StoreError};
use pf_core::ids::OwnerId;
use rusqlite::{Connection, Transaction, params};

pub(in crate::store) struct ProjectEvent<'a> {
    pub(in crate::store) owner: &'a OwnerId,
    pub(in crate::store) ts_ms: i64,
    pub(in crate::store) project_id: Option<&'a str>,
    pub(in crate::store) event_type: &'a str,
    pub(in crate::store) payload: serde_json::Value,
}

/// Appends to `project_events` inside the mutation's transaction; a no-op when the journal is off.
pub(in crate::store) fn append_event_tx(
    tx: &Transaction<'_>,
    journal: bool,
    event: ProjectEvent<'_>,
) -> Result<Option<i64>, StoreError> {
    if !journal {
        return Ok(None);
    }
    let payload_json = serde_json::to_string(&event.payload)
        .map_err(|_| StoreError::InvalidInput("event payload is not serializable"))?;
    tx.execute(
        r#"
        INSERT INTO project_events(owner, ts_ms, project_id, type, payload_json)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            event.owner.as_str(),
            event.ts_ms,
            event.project_id,
            event.event_type,
            payload_json
        ],
    )?;
    Ok(Some(tx.last_insert_rowid()))
}

pub(in crate::store) fn list_events_tx(
    conn: &Connection,
    owner: &OwnerId,
    limit: usize,
) -> Result<Vec<ProjectEventRow>, StoreError> {
    let limit = i64::try_from(limit).map_err(|_| StoreError::InvalidInput("numeric overflow"))?;
    let mut stmt = conn.prepare(
        "SELECT seq, ts_ms, owner, project_id, type, payload_json \
         FROM project_events \
         WHERE owner=?1 \
         ORDER BY seq DESC \
         LIMIT ?2",
    )?;
    let mut rows = stmt.query(params![owner.as_str(), limit])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let payload_json = row.get::<_, String>(5)?;
        let payload = serde_json::from_str(&payload_json)
            .map_err(|_| StoreError::InvalidInput("stored event payload is not valid json"))?;
        out.push(ProjectEventRow {
            seq: row.get(0)?,
            ts_ms: row.get(1)?,
            owner: row.get(2)?,
            project_id: row.get(3)?,
            event_type: row.get(4)?,
            payload,
        });
    }
    Ok(out)
}
