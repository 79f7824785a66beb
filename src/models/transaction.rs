use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Direction of a transaction. The stored amount is always positive; the
/// kind decides which way it moves the budget balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }

    /// Signed change this kind applies to a budget's current amount.
    pub fn balance_effect(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Expense => -amount,
            Self::Income => amount,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub budget_id: i64,
    pub category_id: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// What this transaction did to its budget when it was recorded.
    pub fn balance_effect(&self) -> Decimal {
        self.kind.balance_effect(self.amount)
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub budget_id: i64,
    pub category_key: String,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
}

impl NewTransaction {
    pub fn expense(
        budget_id: i64,
        category_key: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            budget_id,
            category_key: category_key.into(),
            kind: TransactionKind::Expense,
            description: description.into(),
            amount,
        }
    }

    pub fn income(
        budget_id: i64,
        category_key: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            kind: TransactionKind::Income,
            ..Self::expense(budget_id, category_key, description, amount)
        }
    }
}

/// Fields of a recorded transaction that may be edited in place. Amount and
/// kind are deliberately absent: changing them goes through
/// `Database::replace_transaction`.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub category_key: Option<String>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.category_key.is_none()
    }
}
