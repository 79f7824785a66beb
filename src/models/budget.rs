use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A budgeting period for one owner, with a starting and a running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub starting_amount: Decimal,
    /// Only ever moved by signed adjustments from the recorder.
    pub current_amount: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// More has been spent than the budget started with.
    pub fn is_over_budget(&self) -> bool {
        self.current_amount < Decimal::ZERO
    }

    pub fn spent_amount(&self) -> Decimal {
        self.starting_amount.saturating_sub(self.current_amount)
    }

    /// Share of the starting amount spent so far, in percent. A budget that
    /// started at zero reports 0 rather than dividing by zero, and a share
    /// too large to represent saturates at `Decimal::MAX` (or `MIN`).
    pub fn spent_percentage(&self) -> Decimal {
        if self.starting_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let spent = self.spent_amount();
        spent
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(self.starting_amount))
            .or_else(|| {
                spent
                    .checked_div(self.starting_amount)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            })
            .unwrap_or(if spent.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
    }
}

/// A planned amount for one category within a budget. Only read back for
/// breakdowns.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBudget {
    pub id: i64,
    pub budget_id: i64,
    pub category_id: i64,
    pub planned_amount: Decimal,
}

/// Input for a planned amount when creating a budget.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub category_key: String,
    pub planned_amount: Decimal,
}

impl Allocation {
    pub fn new(category_key: impl Into<String>, planned_amount: Decimal) -> Self {
        Self {
            category_key: category_key.into(),
            planned_amount,
        }
    }
}

/// One row of a budget breakdown: what was spent in a category versus what
/// was planned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category_key: String,
    pub label: String,
    pub icon: String,
    /// Net expense total of live transactions (income in the category
    /// counts against it).
    pub spent: Decimal,
    pub planned: Option<Decimal>,
}

impl CategorySpending {
    /// What is left of the plan, if there is one.
    pub fn remaining(&self) -> Option<Decimal> {
        self.planned.map(|planned| planned.saturating_sub(self.spent))
    }
}
