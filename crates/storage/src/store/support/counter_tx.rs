#![forbid(unsafe_code)]

use super::super::StoreError;
use ct_core::CountDelta;
use rusqlite::{OptionalExtension, Transaction, params};
use std::collections::HashSet;
use tracing::debug;

/// Ids from `start` up to and including the thread root, nearest first.
pub(in crate::store) fn ancestor_chain_tx(
    tx: &Transaction<'_>,
    start: Option<&str>,
) -> Result<Vec<String>, StoreError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = start.map(str::to_string);

    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            return Err(StoreError::Corrupt(format!("parent cycle through {id}")));
        }

        let parent = tx
            .query_row(
                "SELECT parent_id FROM contents WHERE id=?1",
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::Corrupt(format!("missing ancestor {id}")))?;

        chain.push(id);
        current = parent;
    }

    Ok(chain)
}

/// Applies `delta` to the published descendant count of every ancestor,
/// starting at `parent_id`.
///
/// Each step is an in-place increment so concurrent adjustments compose;
/// the caller's transaction makes the whole chain atomic.
pub(in crate::store) fn adjust_ancestor_counts_tx(
    tx: &Transaction<'_>,
    parent_id: Option<&str>,
    delta: CountDelta,
) -> Result<usize, StoreError> {
    if delta == CountDelta::Unchanged {
        return Ok(0);
    }

    let chain = ancestor_chain_tx(tx, parent_id)?;
    let mut stmt = tx.prepare_cached(
        "UPDATE contents SET children_deep_count = children_deep_count + ?2 WHERE id = ?1",
    )?;
    for id in &chain {
        stmt.execute(params![id, delta.as_i64()])?;
    }

    debug!(
        ancestors = chain.len(),
        delta = delta.as_i64(),
        "adjusted published descendant counts"
    );
    Ok(chain.len())
}
