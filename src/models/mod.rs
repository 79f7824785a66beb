mod budget;
mod category;
mod transaction;

pub use budget::{Allocation, Budget, CategoryBudget, CategorySpending};
pub use category::{Category, Subscription, CATALOG, DEFAULT_SUBSCRIPTIONS};
pub use transaction::{NewTransaction, Transaction, TransactionChanges, TransactionKind};
