//! Budget Ledger: budget lifecycle and the balance primitive the recorder
//! builds on.
//!
//! An owner has at most one active budget. Creating a budget supersedes the
//! active one in the same transaction, and the partial unique index on
//! `budgets(owner_id) WHERE is_active = 1` backs that up in storage.

use chrono::Utc;
use rust_decimal::Decimal;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};

use crate::catalog::live_category_by_key;
use crate::db::{self, Database};
use crate::error::{Error, Result};
use crate::models::{Allocation, Budget, CategoryBudget, CategorySpending};
use crate::money;

impl Database {
    /// Start a new budgeting period for `owner_id`. Any budget the owner
    /// currently has active is deactivated in the same transaction.
    pub fn create_budget(
        &mut self,
        owner_id: &str,
        name: &str,
        starting_amount: Decimal,
    ) -> Result<Budget> {
        self.create_budget_with_allocations(owner_id, name, starting_amount, &[])
    }

    /// Like [`Database::create_budget`], also planning an amount per
    /// category. Either every row lands or none does.
    pub fn create_budget_with_allocations(
        &mut self,
        owner_id: &str,
        name: &str,
        starting_amount: Decimal,
        allocations: &[Allocation],
    ) -> Result<Budget> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("budget name must not be empty"));
        }
        let starting_amount = money::positive_amount(starting_amount, "starting amount")?;

        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            let key = allocation.category_key.trim().to_lowercase();
            if !seen.insert(key.clone()) {
                return Err(Error::validation(format!(
                    "category {key} is allocated more than once"
                )));
            }
            let amount = money::positive_amount(allocation.planned_amount, "planned amount")?;
            planned.push((key, amount));
        }

        let now = Utc::now();
        let tx = self.begin()?;

        let superseded = db::deactivate_owner_budgets(&tx, owner_id, now)?;
        let id = db::insert_budget(&tx, owner_id, name, starting_amount, now)?;
        for (key, amount) in &planned {
            let category = live_category_by_key(&tx, key)?;
            db::insert_category_budget(&tx, id, category.id, *amount)?;
        }
        let budget = db::find_budget(&tx, id)?.ok_or_else(|| Error::not_found("budget", id))?;

        tx.commit()?;

        for old in superseded {
            tracing::info!(budget_id = old, owner_id, "budget superseded");
        }
        tracing::info!(
            budget_id = budget.id,
            owner_id,
            starting_amount = %budget.starting_amount,
            allocations = planned.len(),
            "created budget"
        );
        Ok(budget)
    }

    /// Reactivate a budget. The owner's other active budget, if any, is
    /// deactivated in the same transaction.
    ///
    /// Fails with [`Error::AlreadyActive`] instead of doing nothing when the
    /// stored budget is already active.
    pub fn activate_budget(&mut self, budget: &Budget) -> Result<Budget> {
        let now = Utc::now();
        let tx = self.begin()?;

        let stored = db::find_budget(&tx, budget.id)?
            .ok_or_else(|| Error::not_found("budget", budget.id))?;
        if stored.is_active() {
            return Err(Error::AlreadyActive(stored.id));
        }
        let superseded = db::deactivate_owner_budgets(&tx, &stored.owner_id, now)?;
        db::set_budget_active(&tx, stored.id, true, now)?;
        let updated =
            db::find_budget(&tx, stored.id)?.ok_or_else(|| Error::not_found("budget", stored.id))?;

        tx.commit()?;

        for old in superseded {
            tracing::info!(budget_id = old, owner_id = %updated.owner_id, "budget superseded");
        }
        tracing::info!(budget_id = updated.id, "activated budget");
        Ok(updated)
    }

    /// Close a budget. Fails with [`Error::AlreadyInactive`] when it is
    /// already closed.
    pub fn deactivate_budget(&mut self, budget: &Budget) -> Result<Budget> {
        let now = Utc::now();
        let tx = self.begin()?;

        let stored = db::find_budget(&tx, budget.id)?
            .ok_or_else(|| Error::not_found("budget", budget.id))?;
        if !stored.is_active() {
            return Err(Error::AlreadyInactive(stored.id));
        }
        db::set_budget_active(&tx, stored.id, false, now)?;
        let updated =
            db::find_budget(&tx, stored.id)?.ok_or_else(|| Error::not_found("budget", stored.id))?;

        tx.commit()?;

        tracing::info!(budget_id = updated.id, "deactivated budget");
        Ok(updated)
    }

    pub fn get_budget(&self, id: i64) -> Result<Budget> {
        db::find_budget(self.conn(), id)?.ok_or_else(|| Error::not_found("budget", id))
    }

    pub fn active_budget(&self, owner_id: &str) -> Result<Option<Budget>> {
        db::find_active_budget(self.conn(), owner_id)
    }

    /// Every budget the owner has had, newest first.
    pub fn budgets_for_owner(&self, owner_id: &str) -> Result<Vec<Budget>> {
        db::list_budgets(self.conn(), owner_id)
    }

    pub fn budget_allocations(&self, budget_id: i64) -> Result<Vec<CategoryBudget>> {
        self.get_budget(budget_id)?;
        db::list_category_budgets(self.conn(), budget_id)
    }

    /// Spending per category against what was planned for it. Covers every
    /// category with live transactions or an allocation, sorted by label.
    pub fn budget_breakdown(&self, budget_id: i64) -> Result<Vec<CategorySpending>> {
        self.get_budget(budget_id)?;
        let conn = self.conn();

        let mut spent: BTreeMap<i64, Decimal> = BTreeMap::new();
        for txn in db::list_live_transactions(conn, budget_id)? {
            let total = spent.entry(txn.category_id).or_default();
            *total = total.saturating_sub(txn.balance_effect());
        }
        let mut planned: BTreeMap<i64, Decimal> = BTreeMap::new();
        for allocation in db::list_category_budgets(conn, budget_id)? {
            planned.insert(allocation.category_id, allocation.planned_amount);
        }

        let category_ids: Vec<i64> = spent
            .keys()
            .chain(planned.keys())
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut rows = Vec::with_capacity(category_ids.len());
        for category_id in category_ids {
            let category = db::find_category(conn, category_id)?
                .ok_or_else(|| Error::not_found("category", category_id))?;
            rows.push(CategorySpending {
                category_key: category.key,
                label: category.label,
                icon: category.icon,
                spent: spent.get(&category_id).copied().unwrap_or_default(),
                planned: planned.get(&category_id).copied(),
            });
        }
        rows.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(rows)
    }
}

/// Move a budget's current amount by `signed_delta`, inside the caller's
/// transaction. The delta is applied to the persisted balance rather than to
/// `budget.current_amount`, so a stale value object cannot overwrite a newer
/// balance. Returns the budget as stored afterwards.
///
/// No business rule applies here; the only failure besides storage is a
/// balance that would leave [`money::max_balance`].
pub(crate) fn adjust_current_amount(
    conn: &Connection,
    budget: &Budget,
    signed_delta: Decimal,
) -> Result<Budget> {
    let stored =
        db::find_budget(conn, budget.id)?.ok_or_else(|| Error::not_found("budget", budget.id))?;
    let updated = money::apply_delta(stored.current_amount, signed_delta)?;
    db::set_current_amount(conn, stored.id, updated, Utc::now())?;
    tracing::debug!(
        budget_id = stored.id,
        delta = %signed_delta,
        "adjusted budget balance"
    );
    db::find_budget(conn, stored.id)?.ok_or_else(|| Error::not_found("budget", stored.id))
}
