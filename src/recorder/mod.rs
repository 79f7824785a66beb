//! Transaction Recorder.
//!
//! Every write here pairs a transaction row change with the matching budget
//! balance adjustment inside one SQLite transaction, so for every budget
//!
//! ```text
//! current_amount == starting_amount - live expenses + live incomes
//! ```
//!
//! holds at every commit. There is no compensation logic; a failed second
//! write rolls the first one back with it.

use chrono::Utc;
use rusqlite::Connection;

use crate::catalog::live_category_by_key;
use crate::db::{self, Database, TransactionRow};
use crate::error::{Error, Result};
use crate::ledger::adjust_current_amount;
use crate::models::{Budget, NewTransaction, Transaction, TransactionChanges};
use crate::money;

impl Database {
    /// Record an expense or income against an active budget and move the
    /// budget's balance by it.
    pub fn create_transaction(&mut self, new: &NewTransaction) -> Result<Transaction> {
        let tx = self.begin()?;
        let (txn, budget) = record(&tx, new)?;
        tx.commit()?;

        tracing::info!(
            transaction_id = txn.id,
            budget_id = budget.id,
            kind = %txn.kind,
            amount = %txn.amount,
            current_amount = %budget.current_amount,
            "recorded transaction"
        );
        Ok(txn)
    }

    /// Soft-delete a transaction and undo its effect on the budget balance.
    pub fn delete_transaction(&mut self, id: i64) -> Result<()> {
        let tx = self.begin()?;
        let (txn, budget) = reverse(&tx, id)?;
        tx.commit()?;

        tracing::info!(
            transaction_id = txn.id,
            budget_id = budget.id,
            current_amount = %budget.current_amount,
            "reversed transaction"
        );
        Ok(())
    }

    /// Edit the description and/or category of a live transaction. Neither
    /// touches the balance.
    pub fn update_transaction(
        &mut self,
        transaction: &Transaction,
        changes: &TransactionChanges,
    ) -> Result<Transaction> {
        let now = Utc::now();
        let tx = self.begin()?;

        let stored = db::find_transaction(&tx, transaction.id)?
            .filter(|t| !t.is_deleted())
            .ok_or_else(|| Error::not_found("transaction", transaction.id))?;
        if changes.is_empty() {
            return Ok(stored);
        }

        let description = match &changes.description {
            Some(description) => required_description(description)?,
            None => stored.description.clone(),
        };
        let category_id = match &changes.category_key {
            Some(key) => live_category_by_key(&tx, key)?.id,
            None => stored.category_id,
        };
        db::update_transaction_details(&tx, stored.id, &description, category_id, now)?;
        let updated = db::find_transaction(&tx, stored.id)?
            .ok_or_else(|| Error::not_found("transaction", stored.id))?;

        tx.commit()?;

        tracing::info!(transaction_id = updated.id, "updated transaction");
        Ok(updated)
    }

    /// Change what a transaction records, amount and kind included, by
    /// reversing the old one and recording `new` in a single transaction.
    pub fn replace_transaction(&mut self, id: i64, new: &NewTransaction) -> Result<Transaction> {
        let tx = self.begin()?;
        let (old, _) = reverse(&tx, id)?;
        let (txn, budget) = record(&tx, new)?;
        tx.commit()?;

        tracing::info!(
            replaced = old.id,
            transaction_id = txn.id,
            budget_id = budget.id,
            current_amount = %budget.current_amount,
            "replaced transaction"
        );
        Ok(txn)
    }

    /// Fetch a transaction, including soft-deleted ones.
    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        db::find_transaction(self.conn(), id)?.ok_or_else(|| Error::not_found("transaction", id))
    }

    /// Live transactions of a budget, newest first.
    pub fn budget_transactions(&self, budget_id: i64) -> Result<Vec<Transaction>> {
        self.get_budget(budget_id)?;
        db::list_live_transactions(self.conn(), budget_id)
    }
}

fn required_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("description must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Insert the transaction and apply its balance effect. Must run inside a
/// transaction opened by the caller.
fn record(conn: &Connection, new: &NewTransaction) -> Result<(Transaction, Budget)> {
    let budget = db::find_budget(conn, new.budget_id)?
        .ok_or_else(|| Error::not_found("budget", new.budget_id))?;
    if !budget.is_active() {
        return Err(Error::BudgetNotActive(budget.id));
    }
    let amount = money::positive_amount(new.amount, "amount")?;
    let description = required_description(&new.description)?;
    let category = live_category_by_key(conn, &new.category_key)?;

    let row = TransactionRow {
        budget_id: budget.id,
        category_id: category.id,
        kind: new.kind,
        description: &description,
        amount,
    };
    let id = db::insert_transaction(conn, &row, Utc::now())?;
    let budget = adjust_current_amount(conn, &budget, new.kind.balance_effect(amount))?;
    let txn = db::find_transaction(conn, id)?.ok_or_else(|| Error::not_found("transaction", id))?;
    Ok((txn, budget))
}

/// Soft-delete a live transaction and apply the inverse of its balance
/// effect. Must run inside a transaction opened by the caller.
fn reverse(conn: &Connection, id: i64) -> Result<(Transaction, Budget)> {
    let txn = db::find_transaction(conn, id)?
        .filter(|t| !t.is_deleted())
        .ok_or_else(|| Error::not_found("transaction", id))?;
    if db::mark_transaction_deleted(conn, id, Utc::now())? == 0 {
        return Err(Error::not_found("transaction", id));
    }
    let budget = db::find_budget(conn, txn.budget_id)?
        .ok_or_else(|| Error::not_found("budget", txn.budget_id))?;
    let budget = adjust_current_amount(conn, &budget, -txn.balance_effect())?;
    let txn = db::find_transaction(conn, id)?.ok_or_else(|| Error::not_found("transaction", id))?;
    Ok((txn, budget))
}

#[cfg(test)]
mod tests;
