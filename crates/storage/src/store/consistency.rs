#![forbid(unsafe_code)]

use super::*;
use ct_core::{ContentTree, CountDrift, find_count_drift};
use rusqlite::{Connection, TransactionBehavior, params};
use tracing::{info, instrument, warn};

fn thread_drift(conn: &Connection, root_id: &str) -> Result<Vec<CountDrift>, StoreError> {
    let root = root_by_ref(conn, &RootRef::Id(root_id.to_string()))?;
    let descendants = subtree_rows(conn, root.id.as_str())?;
    let tree = ContentTree::assemble(root, descendants)?;
    Ok(find_count_drift(&tree))
}

impl SqliteStore {
    /// Recounts published descendants of every node in a thread and reports
    /// the nodes whose stored count disagrees.
    #[instrument(skip(self))]
    pub fn verify_deep_counts(&self, root_id: &str) -> Result<Vec<CountDrift>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let drift = thread_drift(&tx, root_id)?;
        tx.commit()?;
        if !drift.is_empty() {
            warn!(drifted = drift.len(), "published descendant counts drifted");
        }
        Ok(drift)
    }

    /// Rewrites drifted counts of a thread; returns what was corrected.
    #[instrument(skip(self))]
    pub fn rebuild_deep_counts(&mut self, root_id: &str) -> Result<Vec<CountDrift>, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let drift = thread_drift(&tx, root_id)?;
        {
            let mut stmt =
                tx.prepare_cached("UPDATE contents SET children_deep_count=?2 WHERE id=?1")?;
            for entry in &drift {
                let expected = i64::try_from(entry.expected)
                    .map_err(|_| StoreError::validation("numeric overflow"))?;
                stmt.execute(params![entry.id.as_str(), expected])?;
            }
        }
        tx.commit()?;
        if !drift.is_empty() {
            info!(corrected = drift.len(), "rebuilt published descendant counts");
        }
        Ok(drift)
    }
}
