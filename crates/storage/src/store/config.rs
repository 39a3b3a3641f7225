#![forbid(unsafe_code)]

use super::StoreError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_STORAGE_DIR: &str = "CONTENT_TREE_STORAGE_DIR";
pub const ENV_DB_FILE_NAME: &str = "CONTENT_TREE_DB_FILE";
pub const ENV_BUSY_TIMEOUT_MS: &str = "CONTENT_TREE_BUSY_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "content_tree.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub db_file_name: String,
    /// How long a write waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn for_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `CONTENT_TREE_*` environment variables.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.trim().is_empty()) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup(ENV_DB_FILE_NAME).filter(|v| !v.trim().is_empty()) {
            config.db_file_name = name;
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = raw.trim().parse::<u64>().map_err(|_| {
                StoreError::validation(format!("{ENV_BUSY_TIMEOUT_MS} must be an integer"))
            })?;
        }
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(&self.db_file_name)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
