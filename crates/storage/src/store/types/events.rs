#![forbid(unsafe_code)]

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectEventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub owner: String,
    pub project_id: Option<String>,
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl ProjectEventRow {
    pub fn event_id(&self) -> String {
        format!("pev_{:016}", self.seq)
    }
}
