#![forbid(unsafe_code)]

use super::super::*;
use ct_core::{ContentNode, ContentStatus};
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::{debug, instrument};

impl SqliteStore {
    /// Moves a node to `new_status` and adjusts every ancestor's published
    /// descendant count in the same transaction.
    ///
    /// Supported: `draft -> published`, `draft -> deleted`,
    /// `published -> deleted`. Re-applying the current status is rejected.
    #[instrument(skip(self), fields(to = %new_status))]
    pub fn update_status(
        &mut self,
        id: &str,
        new_status: ContentStatus,
    ) -> Result<ContentNode, StoreError> {
        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row = tx
            .query_row(
                "SELECT parent_id, status FROM contents WHERE id=?1",
                params![id],
                |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((parent_id, current)) = row else {
            return Err(StoreError::NotFound);
        };
        let current = current
            .parse::<ContentStatus>()
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let delta = current.transition_to(new_status)?;

        let updated = tx.execute(
            r#"
            UPDATE contents
            SET status = ?2,
                updated_at_ms = ?3,
                published_at_ms = CASE WHEN ?2 = 'published' THEN COALESCE(published_at_ms, ?3)
                                       ELSE published_at_ms END,
                deleted_at_ms = CASE WHEN ?2 = 'deleted' THEN ?3 ELSE deleted_at_ms END
            WHERE id = ?1 AND status = ?4
            "#,
            params![id, new_status.as_str(), now_ms, current.as_str()],
        )?;
        if updated != 1 {
            return Err(StoreError::Corrupt(format!(
                "status of {id} changed during update"
            )));
        }

        let adjusted = adjust_ancestor_counts_tx(&tx, parent_id.as_deref(), delta)?;
        let node = content_by_id(&tx, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        debug!(
            from = %current,
            ancestors = adjusted,
            "updated content status"
        );
        Ok(node)
    }
}
