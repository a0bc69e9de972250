#![forbid(unsafe_code)]

use pf_core::keys::KeyRange;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectRow {
    pub id: String,
    pub owner: String,
    pub left_key: i64,
    pub right_key: i64,
    pub name: String,
    pub color: Option<String>,
    pub is_completed: bool,
    pub level: i64,
    pub path: String,
    pub is_system: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl ProjectRow {
    pub fn range(&self) -> Option<KeyRange> {
        KeyRange::try_new(self.left_key, self.right_key).ok()
    }

    pub fn width(&self) -> i64 {
        1 + self.right_key - self.left_key
    }

    pub fn is_root(&self) -> bool {
        self.is_system && self.left_key == 1
    }
}
