//! Monetary amounts.
//!
//! Amounts are `Decimal` in memory and `TEXT` in SQLite. Nothing here ever
//! goes through a binary float.

use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Fractional digits kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount accepted for a budget, transaction or allocation:
/// 999,999,999,999.99.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// Bound on a running balance. Anything inside it keeps two fractional
/// digits when stored.
pub fn max_balance() -> Decimal {
    Decimal::new(i64::MAX, MONEY_SCALE)
}

/// Validate a user-supplied amount: strictly positive and no more precise
/// than cents. Returns the amount rescaled to [`MONEY_SCALE`].
pub fn positive_amount(amount: Decimal, what: &str) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "{what} must be greater than 0, got {amount}"
        )));
    }
    if amount > max_amount() {
        return Err(Error::validation(format!(
            "{what} must be at most {}, got {amount}",
            max_amount()
        )));
    }
    let normalized = amount.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(Error::validation(format!(
            "{what} must have at most {MONEY_SCALE} decimal places, got {amount}"
        )));
    }
    let mut rescaled = normalized;
    rescaled.rescale(MONEY_SCALE);
    Ok(rescaled)
}

/// Apply a signed change to a balance. Fails with `Validation` instead of
/// overflowing or leaving [`max_balance`].
pub(crate) fn apply_delta(current: Decimal, delta: Decimal) -> Result<Decimal> {
    current
        .checked_add(delta)
        .filter(|balance| balance.abs() <= max_balance())
        .ok_or_else(|| {
            Error::validation(format!("balance {current} cannot move by {delta}"))
        })
}

/// Parse an amount typed by a person, e.g. `"12.5"` or `"1,200.00"`.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| Error::validation(format!("not an amount: {raw:?}")))
}

/// Text representation written to the database.
pub(crate) fn to_column(amount: Decimal) -> String {
    let mut value = amount;
    value.rescale(MONEY_SCALE);
    value.to_string()
}

/// Read a monetary `TEXT` column. A value that does not parse is a
/// conversion failure, not zero.
pub(crate) fn from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
