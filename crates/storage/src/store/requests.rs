#![forbid(unsafe_code)]

use ct_core::{ContentStatus, DEFAULT_DELETED_MARKER};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateContentRequest {
    pub owner_id: String,
    pub parent_id: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub status: ContentStatus,
    /// Defaults to the current wall clock.
    pub created_at_ms: Option<i64>,
}

impl CreateContentRequest {
    pub fn post(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            parent_id: None,
            slug: None,
            title: Some(title.into()),
            body: body.into(),
            status: ContentStatus::Published,
            created_at_ms: None,
        }
    }

    pub fn reply(
        owner_id: impl Into<String>,
        parent_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            parent_id: Some(parent_id.into()),
            slug: None,
            title: None,
            body: body.into(),
            status: ContentStatus::Published,
            created_at_ms: None,
        }
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }
}

/// How a thread root is addressed by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootRef {
    Id(String),
    Slug { owner_id: String, slug: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Viewer whose own drafts are rendered instead of pruned.
    pub include_drafts_for_owner: Option<String>,
    pub deleted_marker: String,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            include_drafts_for_owner: None,
            deleted_marker: DEFAULT_DELETED_MARKER.to_string(),
        }
    }
}
