#![forbid(unsafe_code)]

use crate::ids::{ContentId, OwnerId, Slug};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Deleted,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Deleted => "deleted",
        }
    }

    pub fn is_published(self) -> bool {
        matches!(self, ContentStatus::Published)
    }

    /// Checks a status change and returns the adjustment it implies for every
    /// ancestor's published descendant count.
    ///
    /// Re-applying the current status is rejected so a transition can never be
    /// counted twice.
    pub fn transition_to(self, next: ContentStatus) -> Result<CountDelta, TransitionError> {
        use ContentStatus::*;
        match (self, next) {
            (Draft, Published) => Ok(CountDelta::Increment),
            (Draft, Deleted) => Ok(CountDelta::Unchanged),
            (Published, Deleted) => Ok(CountDelta::Decrement),
            (from, to) => Err(TransitionError { from, to }),
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "deleted" => Ok(ContentStatus::Deleted),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown content status {0:?}")]
pub struct StatusParseError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unsupported status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: ContentStatus,
    pub to: ContentStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountDelta {
    Increment,
    Decrement,
    Unchanged,
}

impl CountDelta {
    pub fn as_i64(self) -> i64 {
        match self {
            CountDelta::Increment => 1,
            CountDelta::Decrement => -1,
            CountDelta::Unchanged => 0,
        }
    }
}

/// A post (no parent) or a comment at any depth beneath one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: ContentId,
    pub owner_id: OwnerId,
    pub parent_id: Option<ContentId>,
    pub root_id: ContentId,
    pub slug: Option<Slug>,
    pub title: Option<String>,
    pub body: String,
    pub status: ContentStatus,
    /// Published descendants at any depth.
    pub children_deep_count: u64,
    /// Insertion ordinal; breaks ties between equal `created_at_ms`.
    pub seq: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub published_at_ms: Option<i64>,
    pub deleted_at_ms: Option<i64>,
}

impl ContentNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn sibling_order_key(&self) -> (i64, i64) {
        (self.created_at_ms, self.seq)
    }
}
