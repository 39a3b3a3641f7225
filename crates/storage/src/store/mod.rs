#![forbid(unsafe_code)]

mod config;
mod consistency;
mod contents;
mod error;
mod materialize;
mod requests;
mod support;

pub use config::*;
pub use error::StoreError;
pub use requests::*;

use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use support::*;
use tracing::info;

/// Node Store over a single SQLite connection.
///
/// Several stores may open the same database file; writes serialize on the
/// SQLite write lock and every counter adjustment commits with the status
/// change that caused it.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(StoreConfig::for_dir(storage_dir.as_ref()))
    }

    pub fn open_with_config(config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.storage_dir)?;

        let db_path = config.db_path();
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(config.busy_timeout())?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            "#,
        )?;

        preflight_gate(&conn)?;
        install_schema(&conn)?;

        info!(path = %db_path.display(), "opened content store");
        Ok(Self { conn, config })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                && message
                    .as_deref()
                    .is_some_and(|value| value.contains("UNIQUE constraint failed"))
        }
        _ => false,
    }
}
