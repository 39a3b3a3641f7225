#![forbid(unsafe_code)]

use crate::ids::ContentId;
use crate::model::ContentNode;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} is not a root")]
    NotARoot(ContentId),
    #[error("node {node} belongs to thread {found}, expected {expected}")]
    ForeignNode {
        node: ContentId,
        expected: ContentId,
        found: ContentId,
    },
    #[error("node {node} references parent {parent} outside the loaded thread")]
    DetachedNode { node: ContentId, parent: ContentId },
    #[error("node {0} appears more than once")]
    DuplicateNode(ContentId),
    #[error("node {0} has no parent but is not the thread root")]
    UnexpectedRoot(ContentId),
}

/// Index of a node inside a [`ContentTree`] arena.
pub type NodeIndex = usize;

#[derive(Clone, Debug)]
pub struct TreeEntry {
    pub node: ContentNode,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub depth: usize,
}

/// A thread held as an arena with explicit parent links.
///
/// Index 0 is always the root. Children of every entry are sorted by
/// creation time ascending, ties broken by insertion ordinal.
#[derive(Clone, Debug)]
pub struct ContentTree {
    entries: Vec<TreeEntry>,
    by_id: HashMap<ContentId, NodeIndex>,
}

impl ContentTree {
    pub const ROOT: NodeIndex = 0;

    /// Assembles a tree from a root and the bulk-loaded rows of its thread.
    ///
    /// `descendants` may arrive in any order; nodes are attached once their
    /// parent has been placed, so no recursion is involved.
    pub fn assemble(
        root: ContentNode,
        descendants: Vec<ContentNode>,
    ) -> Result<Self, TreeError> {
        if !root.is_root() {
            return Err(TreeError::NotARoot(root.id));
        }

        let mut by_id = HashMap::with_capacity(descendants.len() + 1);
        by_id.insert(root.id.clone(), Self::ROOT);
        let mut entries = vec![TreeEntry {
            node: root,
            parent: None,
            children: Vec::new(),
            depth: 0,
        }];

        let root_id = entries[Self::ROOT].node.id.clone();
        let mut pending: HashMap<ContentId, Vec<ContentNode>> = HashMap::new();
        for node in descendants {
            if node.root_id != root_id {
                return Err(TreeError::ForeignNode {
                    node: node.id,
                    expected: root_id,
                    found: node.root_id,
                });
            }
            let Some(parent) = node.parent_id.clone() else {
                if node.id == root_id {
                    return Err(TreeError::DuplicateNode(node.id));
                }
                return Err(TreeError::UnexpectedRoot(node.id));
            };
            pending.entry(parent).or_default().push(node);
        }

        let mut frontier = vec![Self::ROOT];
        while let Some(parent_index) = frontier.pop() {
            let parent_id = entries[parent_index].node.id.clone();
            let Some(mut children) = pending.remove(&parent_id) else {
                continue;
            };
            children.sort_by_key(ContentNode::sibling_order_key);

            let depth = entries[parent_index].depth + 1;
            for child in children {
                let index = entries.len();
                if by_id.insert(child.id.clone(), index).is_some() {
                    return Err(TreeError::DuplicateNode(child.id));
                }
                entries.push(TreeEntry {
                    node: child,
                    parent: Some(parent_index),
                    children: Vec::new(),
                    depth,
                });
                entries[parent_index].children.push(index);
                frontier.push(index);
            }
        }

        if let Some((parent, orphans)) = pending.into_iter().next()
            && let Some(orphan) = orphans.into_iter().next()
        {
            return Err(TreeError::DetachedNode {
                node: orphan.id,
                parent,
            });
        }

        Ok(Self { entries, by_id })
    }

    pub fn root(&self) -> &TreeEntry {
        &self.entries[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: NodeIndex) -> &TreeEntry {
        &self.entries[index]
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn index_of(&self, id: &ContentId) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &ContentId) -> Option<&TreeEntry> {
        self.index_of(id).map(|index| &self.entries[index])
    }

    /// Ancestors of `index`, nearest first, ending at the root.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.entries[index].parent,
        }
    }

    /// Indices in pre-order: parents before children, siblings in order.
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut stack = vec![Self::ROOT];
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.entries[index].children.iter().rev().copied());
        }
        out
    }
}

pub struct Ancestors<'a> {
    tree: &'a ContentTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.entries[current].parent;
        Some(current)
    }
}
