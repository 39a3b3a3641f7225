#![forbid(unsafe_code)]

use ct_core::{ContentStatus, TransitionError, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input to a write, e.g. an empty body or an unknown parent.
    #[error("validation error: {0}")]
    Validation(String),
    /// Unknown id, unknown slug, or a root that cannot be shown.
    #[error("not found")]
    NotFound,
    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: ContentStatus,
        to: ContentStatus,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("corrupt thread: {0}")]
    Tree(#[from] TreeError),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::Tree(_) | Self::Corrupt(_) => "CORRUPT_TREE",
        }
    }
}

impl From<TransitionError> for StoreError {
    fn from(value: TransitionError) -> Self {
        Self::InvalidTransition {
            from: value.from,
            to: value.to,
        }
    }
}
