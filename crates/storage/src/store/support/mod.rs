#![forbid(unsafe_code)]

mod counter_tx;
mod rows;
mod schema;
mod time;

pub(super) use counter_tx::*;
pub(super) use rows::*;
pub(super) use schema::{install_schema, preflight_gate};
pub(super) use time::now_ms;
