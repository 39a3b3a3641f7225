#![forbid(unsafe_code)]

use crate::ids::OwnerId;
use crate::model::{ContentNode, ContentStatus};
use crate::tree::ContentTree;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Rendered with body and author.
    Visible,
    /// Deleted, kept as a marker because published replies hang beneath it.
    Placeholder,
    /// Omitted together with its subtree.
    Pruned,
}

/// Read-time classification rules for a thread.
///
/// Classification depends only on the node's current status and
/// `children_deep_count`, so it is recomputed on every read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub include_drafts_for_owner: Option<OwnerId>,
}

impl VisibilityPolicy {
    pub fn new(include_drafts_for_owner: Option<OwnerId>) -> Self {
        Self {
            include_drafts_for_owner,
        }
    }

    pub fn can_see_draft(&self, node: &ContentNode) -> bool {
        self.include_drafts_for_owner.as_ref() == Some(&node.owner_id)
    }

    /// Whether a root may be materialized at all for this viewer.
    pub fn root_is_accessible(&self, root: &ContentNode) -> bool {
        match root.status {
            ContentStatus::Published => true,
            ContentStatus::Draft => self.can_see_draft(root),
            ContentStatus::Deleted => false,
        }
    }

    pub fn classify(&self, node: &ContentNode) -> Visibility {
        match node.status {
            ContentStatus::Published => Visibility::Visible,
            ContentStatus::Draft if self.can_see_draft(node) => Visibility::Visible,
            ContentStatus::Draft => Visibility::Pruned,
            ContentStatus::Deleted if node.children_deep_count > 0 => Visibility::Placeholder,
            ContentStatus::Deleted => Visibility::Pruned,
        }
    }

    /// Classifies every entry of the arena; the root is always visible.
    pub fn classify_tree(&self, tree: &ContentTree) -> Vec<Visibility> {
        tree.entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if index == ContentTree::ROOT {
                    Visibility::Visible
                } else {
                    self.classify(&entry.node)
                }
            })
            .collect()
    }
}
