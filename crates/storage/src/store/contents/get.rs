#![forbid(unsafe_code)]

use super::super::*;
use ct_core::ContentNode;
use tracing::instrument;

impl SqliteStore {
    pub fn get(&self, id: &str) -> Result<ContentNode, StoreError> {
        content_by_id(&self.conn, id)?.ok_or(StoreError::NotFound)
    }

    /// Resolves a thread root by id or by `(owner, slug)`.
    ///
    /// Comments never resolve here, even when addressed by id.
    pub fn find_by_root(&self, root_ref: &RootRef) -> Result<ContentNode, StoreError> {
        root_by_ref(&self.conn, root_ref)
    }

    /// All descendants of a root regardless of status, ordered by creation.
    #[instrument(skip(self))]
    pub fn load_subtree(&self, root_id: &str) -> Result<Vec<ContentNode>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let root = root_by_ref(&tx, &RootRef::Id(root_id.to_string()))?;
        let rows = subtree_rows(&tx, root.id.as_str())?;
        tx.commit()?;
        Ok(rows)
    }

    /// Direct replies of `id` in sibling order, regardless of status.
    pub fn list_children(&self, id: &str) -> Result<Vec<ContentNode>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        if content_by_id(&tx, id)?.is_none() {
            return Err(StoreError::NotFound);
        }
        let rows = children_rows(&tx, id)?;
        tx.commit()?;
        Ok(rows)
    }
}
