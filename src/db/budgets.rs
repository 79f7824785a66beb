use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Budget, CategoryBudget};
use crate::money;

const BUDGET_COLUMNS: &str =
    "id, owner_id, name, starting_amount, current_amount, is_active, created_at, updated_at";

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        starting_amount: money::from_column(row, 3)?,
        current_amount: money::from_column(row, 4)?,
        active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert an active budget whose current amount starts at `starting_amount`.
pub(crate) fn insert_budget(
    conn: &Connection,
    owner_id: &str,
    name: &str,
    starting_amount: Decimal,
    now: DateTime<Utc>,
) -> Result<i64> {
    let amount = money::to_column(starting_amount);
    conn.execute(
        "INSERT INTO budgets (owner_id, name, starting_amount, current_amount, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3, 1, ?4, ?4)",
        params![owner_id, name, amount, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn find_budget(conn: &Connection, id: i64) -> Result<Option<Budget>> {
    let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], budget_from_row)
        .optional()?)
}

pub(crate) fn find_active_budget(conn: &Connection, owner_id: &str) -> Result<Option<Budget>> {
    let sql = format!(
        "SELECT {BUDGET_COLUMNS} FROM budgets WHERE owner_id = ?1 AND is_active = 1
         ORDER BY id DESC LIMIT 1"
    );
    Ok(conn
        .query_row(&sql, params![owner_id], budget_from_row)
        .optional()?)
}

/// All budgets of an owner, newest first.
pub(crate) fn list_budgets(conn: &Connection, owner_id: &str) -> Result<Vec<Budget>> {
    let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE owner_id = ?1 ORDER BY id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], budget_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub(crate) fn set_budget_active(
    conn: &Connection,
    id: i64,
    active: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE budgets SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active, now, id],
    )?;
    Ok(())
}

/// Deactivate whatever budget the owner has active. Returns the IDs that
/// were switched off (zero or one, given the partial unique index).
pub(crate) fn deactivate_owner_budgets(
    conn: &Connection,
    owner_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM budgets WHERE owner_id = ?1 AND is_active = 1")?;
    let ids = stmt
        .query_map(params![owner_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    for id in &ids {
        set_budget_active(conn, *id, false, now)?;
    }
    Ok(ids)
}

pub(crate) fn set_current_amount(
    conn: &Connection,
    id: i64,
    current_amount: Decimal,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE budgets SET current_amount = ?1, updated_at = ?2 WHERE id = ?3",
        params![money::to_column(current_amount), now, id],
    )?;
    Ok(())
}

// ── Category allocations ──────────────────────────────────────

pub(crate) fn insert_category_budget(
    conn: &Connection,
    budget_id: i64,
    category_id: i64,
    planned_amount: Decimal,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO category_budgets (budget_id, category_id, planned_amount) VALUES (?1, ?2, ?3)",
        params![budget_id, category_id, money::to_column(planned_amount)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn list_category_budgets(conn: &Connection, budget_id: i64) -> Result<Vec<CategoryBudget>> {
    let mut stmt = conn.prepare(
        "SELECT id, budget_id, category_id, planned_amount FROM category_budgets
         WHERE budget_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![budget_id], |row| {
        Ok(CategoryBudget {
            id: row.get(0)?,
            budget_id: row.get(1)?,
            category_id: row.get(2)?,
            planned_amount: money::from_column(row, 3)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}
