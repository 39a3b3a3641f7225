#![forbid(unsafe_code)]

pub mod counts;
pub mod ids;
pub mod model;
pub mod serialize;
pub mod tree;
pub mod visibility;

pub use counts::{CountDrift, find_count_drift, recount_deep_counts};
pub use ids::{ContentId, ContentIdError, OwnerId, OwnerIdError, Slug, SlugError};
pub use model::{ContentNode, ContentStatus, CountDelta, StatusParseError, TransitionError};
pub use serialize::{DEFAULT_DELETED_MARKER, SerializedNode, SerializedTree, serialize_tree};
pub use tree::{ContentTree, NodeIndex, TreeEntry, TreeError};
pub use visibility::{Visibility, VisibilityPolicy};

/// Assembles, classifies and serializes one thread.
///
/// The caller is responsible for checking that the root is accessible to the
/// viewer (see [`VisibilityPolicy::root_is_accessible`]).
pub fn materialize_thread(
    root: ContentNode,
    descendants: Vec<ContentNode>,
    policy: &VisibilityPolicy,
    deleted_marker: &str,
) -> Result<SerializedTree, TreeError> {
    let tree = ContentTree::assemble(root, descendants)?;
    let classes = policy.classify_tree(&tree);
    let out = serialize_tree(&tree, &classes, deleted_marker);
    tracing::debug!(
        root = %tree.root().node.id,
        loaded = tree.len(),
        visible = out.visible_count,
        placeholders = out.placeholder_count,
        "materialized thread"
    );
    Ok(out)
}
