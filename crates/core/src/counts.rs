#![forbid(unsafe_code)]

use crate::ids::ContentId;
use crate::tree::ContentTree;
use serde::Serialize;

/// Published descendants of every entry, recomputed from statuses alone.
///
/// The result is indexed like the tree arena.
pub fn recount_deep_counts(tree: &ContentTree) -> Vec<u64> {
    let mut counts = vec![0u64; tree.len()];
    for index in tree.preorder().into_iter().rev() {
        let entry = tree.entry(index);
        let Some(parent) = entry.parent else {
            continue;
        };
        let own = u64::from(entry.node.status.is_published());
        counts[parent] += counts[index] + own;
    }
    counts
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountDrift {
    pub id: ContentId,
    pub stored: u64,
    pub expected: u64,
}

/// Entries whose stored `children_deep_count` disagrees with a recount.
pub fn find_count_drift(tree: &ContentTree) -> Vec<CountDrift> {
    recount_deep_counts(tree)
        .into_iter()
        .zip(tree.entries())
        .filter(|(expected, entry)| entry.node.children_deep_count != *expected)
        .map(|(expected, entry)| CountDrift {
            id: entry.node.id.clone(),
            stored: entry.node.children_deep_count,
            expected,
        })
        .collect()
}
