use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Transaction, TransactionKind};
use crate::money;

const TRANSACTION_COLUMNS: &str =
    "id, budget_id, category_id, kind, description, amount, created_at, updated_at, deleted_at";

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let raw_kind: String = row.get(3)?;
    let kind = TransactionKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown transaction kind {raw_kind:?}").into(),
        )
    })?;
    Ok(Transaction {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        category_id: row.get(2)?,
        kind,
        description: row.get(4)?,
        amount: money::from_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        deleted_at: row.get(8)?,
    })
}

pub(crate) struct TransactionRow<'a> {
    pub(crate) budget_id: i64,
    pub(crate) category_id: i64,
    pub(crate) kind: TransactionKind,
    pub(crate) description: &'a str,
    pub(crate) amount: rust_decimal::Decimal,
}

pub(crate) fn insert_transaction(
    conn: &Connection,
    txn: &TransactionRow<'_>,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (budget_id, category_id, kind, description, amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            txn.budget_id,
            txn.category_id,
            txn.kind.as_str(),
            txn.description,
            money::to_column(txn.amount),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a transaction whether or not it has been soft-deleted.
pub(crate) fn find_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], transaction_from_row)
        .optional()?)
}

/// Live (not soft-deleted) transactions of a budget, newest first.
pub(crate) fn list_live_transactions(conn: &Connection, budget_id: i64) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions
         WHERE budget_id = ?1 AND deleted_at IS NULL
         ORDER BY id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![budget_id], transaction_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Soft-delete a live transaction. Returns the number of rows touched, so 0
/// means it was missing or already deleted.
pub(crate) fn mark_transaction_deleted(
    conn: &Connection,
    id: i64,
    now: DateTime<Utc>,
) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE transactions SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?)
}

pub(crate) fn update_transaction_details(
    conn: &Connection,
    id: i64,
    description: &str,
    category_id: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET description = ?1, category_id = ?2, updated_at = ?3 WHERE id = ?4",
        params![description, category_id, now, id],
    )?;
    Ok(())
}
