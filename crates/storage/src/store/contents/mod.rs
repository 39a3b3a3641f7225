#![forbid(unsafe_code)]

mod create;
mod get;
mod status;
