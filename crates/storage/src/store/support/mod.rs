#![forbid(unsafe_code)]

mod events_tx;
mod forest_tx;
mod range_tx;
mod schema;
mod time;

pub(super) use events_tx::*;
pub(super) use forest_tx::*;
pub(super) use range_tx::*;
pub(super) use schema::{ensure_write_capability, install_schema, preflight_gate};
pub(super) use time::now_ms;
