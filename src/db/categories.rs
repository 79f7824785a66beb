use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Category, Subscription};

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        key: row.get(1)?,
        label: row.get(2)?,
        icon: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category_id: row.get(2)?,
        created_at: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}

/// Add a catalog entry; a key that already exists is left as it is.
pub(crate) fn insert_category(conn: &Connection, key: &str, label: &str, icon: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO categories (key, label, icon) VALUES (?1, ?2, ?3)",
        params![key, label, icon],
    )?;
    Ok(())
}

/// Fetch a category by ID, retired or not.
pub(crate) fn find_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    Ok(conn
        .query_row(
            "SELECT id, key, label, icon, deleted_at FROM categories WHERE id = ?1",
            params![id],
            category_from_row,
        )
        .optional()?)
}

/// Fetch a category by key, retired or not.
pub(crate) fn find_category_by_key(conn: &Connection, key: &str) -> Result<Option<Category>> {
    Ok(conn
        .query_row(
            "SELECT id, key, label, icon, deleted_at FROM categories WHERE key = ?1",
            params![key.trim().to_lowercase()],
            category_from_row,
        )
        .optional()?)
}

/// Every category that has not been retired, by label.
pub(crate) fn list_live_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, key, label, icon, deleted_at FROM categories
         WHERE deleted_at IS NULL ORDER BY label",
    )?;
    let rows = stmt.query_map([], category_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// The whole catalog, retired categories included.
pub(crate) fn list_all_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, key, label, icon, deleted_at FROM categories ORDER BY id")?;
    let rows = stmt.query_map([], category_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Categories an owner has a live subscription to, skipping retired ones.
pub(crate) fn list_owner_categories(conn: &Connection, owner_id: &str) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.key, c.label, c.icon, c.deleted_at
         FROM user_categories uc
         JOIN categories c ON c.id = uc.category_id
         WHERE uc.owner_id = ?1 AND uc.deleted_at IS NULL AND c.deleted_at IS NULL
         ORDER BY c.label",
    )?;
    let rows = stmt.query_map(params![owner_id], category_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub(crate) fn mark_category_deleted(conn: &Connection, id: i64, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE categories SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

// ── Subscriptions ─────────────────────────────────────────────

/// The owner's subscription row for a category, live or soft-deleted.
pub(crate) fn find_subscription(
    conn: &Connection,
    owner_id: &str,
    category_id: i64,
) -> Result<Option<Subscription>> {
    Ok(conn
        .query_row(
            "SELECT id, owner_id, category_id, created_at, deleted_at FROM user_categories
             WHERE owner_id = ?1 AND category_id = ?2",
            params![owner_id, category_id],
            subscription_from_row,
        )
        .optional()?)
}

pub(crate) fn insert_subscription(
    conn: &Connection,
    owner_id: &str,
    category_id: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO user_categories (owner_id, category_id, created_at) VALUES (?1, ?2, ?3)",
        params![owner_id, category_id, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn set_subscription_deleted_at(
    conn: &Connection,
    id: i64,
    deleted_at: Option<DateTime<Utc>>,
) -> Result<()> {
    conn.execute(
        "UPDATE user_categories SET deleted_at = ?1 WHERE id = ?2",
        params![deleted_at, id],
    )?;
    Ok(())
}
