#![forbid(unsafe_code)]

use super::super::{RootRef, StoreError};
use ct_core::{ContentId, ContentNode, ContentStatus, OwnerId, Slug};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(in crate::store) const CONTENT_COLUMNS: &str =
    "seq, id, owner_id, parent_id, root_id, slug, title, body, status, children_deep_count, \
     created_at_ms, updated_at_ms, published_at_ms, deleted_at_ms";

fn parse_text<T, E>(
    row: &Row<'_>,
    index: usize,
    parse: impl FnOnce(String) -> Result<T, E>,
) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let raw = row.get::<_, String>(index)?;
    parse(raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

fn parse_optional_text<T, E>(
    row: &Row<'_>,
    index: usize,
    parse: impl FnOnce(String) -> Result<T, E>,
) -> rusqlite::Result<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match row.get::<_, Option<String>>(index)? {
        Some(raw) => parse(raw).map(Some).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
        }),
        None => Ok(None),
    }
}

pub(in crate::store) fn content_from_row(row: &Row<'_>) -> rusqlite::Result<ContentNode> {
    let count = row.get::<_, i64>(9)?;
    Ok(ContentNode {
        seq: row.get(0)?,
        id: parse_text(row, 1, |raw| ContentId::try_new(raw))?,
        owner_id: parse_text(row, 2, |raw| OwnerId::try_new(raw))?,
        parent_id: parse_optional_text(row, 3, |raw| ContentId::try_new(raw))?,
        root_id: parse_text(row, 4, |raw| ContentId::try_new(raw))?,
        slug: parse_optional_text(row, 5, |raw| Slug::try_new(raw))?,
        title: row.get(6)?,
        body: row.get(7)?,
        status: parse_text(row, 8, |raw| raw.parse::<ContentStatus>())?,
        children_deep_count: u64::try_from(count).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(9, Type::Integer, Box::new(err))
        })?,
        created_at_ms: row.get(10)?,
        updated_at_ms: row.get(11)?,
        published_at_ms: row.get(12)?,
        deleted_at_ms: row.get(13)?,
    })
}

pub(in crate::store) fn content_by_id(
    conn: &Connection,
    id: &str,
) -> Result<Option<ContentNode>, StoreError> {
    let sql = format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id=?1");
    Ok(conn
        .query_row(&sql, params![id], content_from_row)
        .optional()?)
}

pub(in crate::store) fn root_by_ref(
    conn: &Connection,
    root_ref: &RootRef,
) -> Result<ContentNode, StoreError> {
    let found = match root_ref {
        RootRef::Id(id) => content_by_id(conn, id)?,
        RootRef::Slug { owner_id, slug } => {
            let sql = format!(
                "SELECT {CONTENT_COLUMNS} FROM contents \
                 WHERE owner_id=?1 AND slug=?2 AND parent_id IS NULL"
            );
            conn.query_row(&sql, params![owner_id, slug], content_from_row)
                .optional()?
        }
    };
    match found {
        Some(node) if node.is_root() => Ok(node),
        _ => Err(StoreError::NotFound),
    }
}

/// Every descendant of a thread root in one query on the root partition.
pub(in crate::store) fn subtree_rows(
    conn: &Connection,
    root_id: &str,
) -> Result<Vec<ContentNode>, StoreError> {
    let sql = format!(
        "SELECT {CONTENT_COLUMNS} FROM contents \
         WHERE root_id=?1 AND parent_id IS NOT NULL \
         ORDER BY created_at_ms ASC, seq ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![root_id], content_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(in crate::store) fn children_rows(
    conn: &Connection,
    parent_id: &str,
) -> Result<Vec<ContentNode>, StoreError> {
    let sql = format!(
        "SELECT {CONTENT_COLUMNS} FROM contents \
         WHERE parent_id=?1 \
         ORDER BY created_at_ms ASC, seq ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![parent_id], content_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
