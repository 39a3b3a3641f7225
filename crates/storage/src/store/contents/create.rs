#![forbid(unsafe_code)]

use super::super::*;
use ct_core::{ContentId, ContentNode, ContentStatus, CountDelta, OwnerId, Slug, ids::MAX_SLUG_LEN};
use rusqlite::{OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, instrument};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 255;
const MAX_SLUG_ATTEMPTS: usize = 1_000;

impl SqliteStore {
    /// Persists a new post or reply.
    ///
    /// A published reply bumps the published descendant count of every
    /// ancestor in the same transaction as the insert.
    #[instrument(
        skip(self, request),
        fields(owner = %request.owner_id, parent = ?request.parent_id)
    )]
    pub fn create(&mut self, request: CreateContentRequest) -> Result<ContentNode, StoreError> {
        let CreateContentRequest {
            owner_id,
            parent_id,
            slug,
            title,
            body,
            status,
            created_at_ms,
        } = request;

        let owner_id =
            OwnerId::try_new(owner_id).map_err(|err| StoreError::validation(err.to_string()))?;
        if body.trim().is_empty() {
            return Err(StoreError::validation("body must not be empty"));
        }
        if status == ContentStatus::Deleted {
            return Err(StoreError::validation(
                "content must be created as draft or published",
            ));
        }
        let title = match title {
            Some(title) if title.trim().is_empty() => {
                return Err(StoreError::validation("title must not be blank"));
            }
            Some(title) if title.chars().count() > MAX_TITLE_LEN => {
                return Err(StoreError::validation("title is too long"));
            }
            other => other,
        };
        let parent_id = parent_id
            .map(|id| ContentId::try_new(id))
            .transpose()
            .map_err(|err| StoreError::validation(err.to_string()))?;

        let now_ms = now_ms();
        let created_at_ms = created_at_ms.unwrap_or(now_ms);
        let id = ContentId::try_new(Uuid::new_v4().to_string())
            .map_err(|err| StoreError::validation(err.to_string()))?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (root_id, slug) = match parent_id.as_ref() {
            Some(parent_id) => {
                if title.is_some() {
                    return Err(StoreError::validation("replies cannot have a title"));
                }
                if slug.is_some() {
                    return Err(StoreError::validation("only root content can have a slug"));
                }
                let parent = content_by_id(&tx, parent_id.as_str())?.ok_or_else(|| {
                    StoreError::validation("parent_id does not reference existing content")
                })?;
                if parent.status != ContentStatus::Published {
                    return Err(StoreError::validation(format!(
                        "cannot reply to {} content",
                        parent.status
                    )));
                }
                (parent.root_id, None)
            }
            None => {
                let slug = resolve_root_slug_tx(&tx, &owner_id, slug, title.as_deref())?;
                (id.clone(), slug)
            }
        };

        let published_at_ms = status.is_published().then_some(created_at_ms);
        let insert = tx.execute(
            r#"
            INSERT INTO contents(id, owner_id, parent_id, root_id, slug, title, body, status,
                                 children_deep_count, created_at_ms, updated_at_ms, published_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9, ?10)
            "#,
            params![
                id.as_str(),
                owner_id.as_str(),
                parent_id.as_ref().map(ContentId::as_str),
                root_id.as_str(),
                slug.as_ref().map(Slug::as_str),
                title,
                body,
                status.as_str(),
                created_at_ms,
                published_at_ms,
            ],
        );
        if let Err(err) = insert {
            if is_unique_violation(&err) {
                return Err(StoreError::validation("slug already used by this owner"));
            }
            return Err(StoreError::Sql(err));
        }

        let delta = if status.is_published() {
            CountDelta::Increment
        } else {
            CountDelta::Unchanged
        };
        adjust_ancestor_counts_tx(&tx, parent_id.as_ref().map(ContentId::as_str), delta)?;

        let node = content_by_id(&tx, id.as_str())?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        debug!(id = %node.id, root = %node.root_id, status = %node.status, "created content");
        Ok(node)
    }
}

/// Explicit slugs must be free; slugs derived from the title get a numeric
/// suffix until they are.
fn resolve_root_slug_tx(
    tx: &Transaction<'_>,
    owner_id: &OwnerId,
    explicit: Option<String>,
    title: Option<&str>,
) -> Result<Option<Slug>, StoreError> {
    if let Some(raw) = explicit {
        let slug = Slug::try_new(raw).map_err(|err| StoreError::validation(err.to_string()))?;
        if slug_taken_tx(tx, owner_id, &slug)? {
            return Err(StoreError::validation("slug already used by this owner"));
        }
        return Ok(Some(slug));
    }

    let Some(base) = title.and_then(Slug::from_title) else {
        return Ok(None);
    };
    if !slug_taken_tx(tx, owner_id, &base)? {
        return Ok(Some(base));
    }

    for n in 2..MAX_SLUG_ATTEMPTS + 2 {
        let suffix = format!("-{n}");
        let mut stem = base.as_str().to_string();
        stem.truncate(MAX_SLUG_LEN - suffix.len());
        let stem = stem.trim_end_matches('-');
        let candidate = Slug::try_new(format!("{stem}{suffix}"))
            .map_err(|err| StoreError::validation(err.to_string()))?;
        if !slug_taken_tx(tx, owner_id, &candidate)? {
            return Ok(Some(candidate));
        }
    }
    Err(StoreError::validation("could not derive a free slug from title"))
}

fn slug_taken_tx(
    tx: &Transaction<'_>,
    owner_id: &OwnerId,
    slug: &Slug,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM contents WHERE owner_id=?1 AND slug=?2",
            params![owner_id.as_str(), slug.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}
