#![forbid(unsafe_code)]

use super::*;
use ct_core::{OwnerId, SerializedTree, VisibilityPolicy, materialize_thread};
use tracing::instrument;

impl SqliteStore {
    /// Loads a thread and returns it classified and ready to render.
    ///
    /// The root lookup and the subtree load share one read transaction, so a
    /// request sees a single snapshot of statuses and counts. Unknown, deleted
    /// and foreign-draft roots are all `NotFound`; a malformed
    /// `include_drafts_for_owner` is treated as an anonymous viewer.
    #[instrument(skip(self, options))]
    pub fn materialize(
        &self,
        root_ref: &RootRef,
        options: &MaterializeOptions,
    ) -> Result<SerializedTree, StoreError> {
        // A viewer id that could never own content sees no drafts.
        let viewer = options
            .include_drafts_for_owner
            .as_deref()
            .and_then(|owner| OwnerId::try_new(owner).ok());
        let policy = VisibilityPolicy::new(viewer);

        let tx = self.conn.unchecked_transaction()?;
        let root = root_by_ref(&tx, root_ref)?;
        if !policy.root_is_accessible(&root) {
            return Err(StoreError::NotFound);
        }
        let descendants = subtree_rows(&tx, root.id.as_str())?;
        tx.commit()?;

        Ok(materialize_thread(
            root,
            descendants,
            &policy,
            &options.deleted_marker,
        )?)
    }
}
