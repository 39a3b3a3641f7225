#![forbid(unsafe_code)]

use crate::ids::{ContentId, OwnerId};
use crate::model::ContentStatus;
use crate::tree::{ContentTree, NodeIndex};
use crate::visibility::Visibility;
use serde::Serialize;

pub const DEFAULT_DELETED_MARKER: &str = "[content deleted]";

/// Render-ready node. Placeholders carry no author, no title and the
/// deletion marker instead of their body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SerializedNode {
    pub id: ContentId,
    /// Rendered parent. For replies under a folded placeholder this is the
    /// outer placeholder, not the stored parent.
    pub parent_id: Option<ContentId>,
    pub depth: usize,
    pub owner_id: Option<OwnerId>,
    pub title: Option<String>,
    pub body: String,
    pub status: ContentStatus,
    /// Set for deleted nodes kept for connectivity; the renderer must not
    /// offer reply, vote or author links on them.
    pub is_placeholder: bool,
    pub children_deep_count: u64,
    pub created_at_ms: i64,
}

/// A thread flattened in pre-order; `nodes[0]` is the root and every node
/// follows its rendered parent, so nesting is rebuilt from `parent_id` and
/// `depth` without walking pointers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SerializedTree {
    pub nodes: Vec<SerializedNode>,
    pub visible_count: usize,
    pub placeholder_count: usize,
}

impl SerializedTree {
    pub fn root(&self) -> &SerializedNode {
        &self.nodes[0]
    }

    /// Nodes in pre-order.
    pub fn walk(&self) -> &[SerializedNode] {
        &self.nodes
    }

    /// Rendered children of `id` in sibling order.
    pub fn children(&self, id: &ContentId) -> Vec<&SerializedNode> {
        self.nodes
            .iter()
            .filter(|node| node.parent_id.as_ref() == Some(id))
            .collect()
    }

    pub fn find(&self, id: &ContentId) -> Option<&SerializedNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.find(id).is_some()
    }
}

/// Flattens a classified arena into pre-order output.
///
/// Pruned entries drop out with their subtree. A placeholder directly under
/// another placeholder is folded into it: its surviving children take its
/// place in the outer child list, so a run of deleted ancestors renders one
/// marker.
pub fn serialize_tree(
    tree: &ContentTree,
    classes: &[Visibility],
    deleted_marker: &str,
) -> SerializedTree {
    debug_assert_eq!(tree.len(), classes.len());

    let order = tree.preorder();

    // Root is never pruned here; the store rejects inaccessible roots first.
    let mut rendered = vec![false; tree.len()];
    let mut folded = vec![false; tree.len()];
    for &index in &order {
        let Some(parent) = tree.entry(index).parent else {
            rendered[index] = true;
            continue;
        };
        rendered[index] = rendered[parent] && classes[index] != Visibility::Pruned;
        folded[index] = rendered[index]
            && classes[index] == Visibility::Placeholder
            && classes[parent] == Visibility::Placeholder;
    }

    // Emitted child lists, resolved bottom-up so a folded list is complete
    // before its parent splices it in.
    let mut emitted: Vec<Vec<NodeIndex>> = vec![Vec::new(); tree.len()];
    for &index in order.iter().rev() {
        if !rendered[index] {
            continue;
        }
        let mut list = Vec::new();
        for &child in &tree.entry(index).children {
            if !rendered[child] {
                continue;
            }
            if folded[child] {
                list.append(&mut emitted[child]);
            } else {
                list.push(child);
            }
        }
        emitted[index] = list;
    }

    let mut nodes = Vec::new();
    let mut visible_count = 0;
    let mut placeholder_count = 0;
    let mut stack: Vec<(NodeIndex, Option<ContentId>, usize)> =
        vec![(ContentTree::ROOT, None, 0)];
    while let Some((index, parent_id, depth)) = stack.pop() {
        let is_placeholder =
            index != ContentTree::ROOT && classes[index] == Visibility::Placeholder;
        if is_placeholder {
            placeholder_count += 1;
        } else {
            visible_count += 1;
        }
        let node = build_node(tree, index, parent_id, depth, is_placeholder, deleted_marker);
        for &child in emitted[index].iter().rev() {
            stack.push((child, Some(node.id.clone()), depth + 1));
        }
        nodes.push(node);
    }

    SerializedTree {
        nodes,
        visible_count,
        placeholder_count,
    }
}

fn build_node(
    tree: &ContentTree,
    index: NodeIndex,
    parent_id: Option<ContentId>,
    depth: usize,
    is_placeholder: bool,
    deleted_marker: &str,
) -> SerializedNode {
    let node = &tree.entry(index).node;
    if is_placeholder {
        return SerializedNode {
            id: node.id.clone(),
            parent_id,
            depth,
            owner_id: None,
            title: None,
            body: deleted_marker.to_string(),
            status: node.status,
            is_placeholder: true,
            children_deep_count: node.children_deep_count,
            created_at_ms: node.created_at_ms,
        };
    }
    SerializedNode {
        id: node.id.clone(),
        parent_id,
        depth,
        owner_id: Some(node.owner_id.clone()),
        title: node.title.clone(),
        body: node.body.clone(),
        status: node.status,
        is_placeholder: false,
        children_deep_count: node.children_deep_count,
        created_at_ms: node.created_at_ms,
    }
}
