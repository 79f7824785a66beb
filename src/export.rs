//! CSV export of a budget's live transactions.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::db::{list_all_categories, Database};
use crate::money;

const HEADER: [&str; 6] = ["id", "created_at", "kind", "category", "description", "amount"];

/// Write the live transactions of `budget_id` to `path`, newest first.
/// Returns the number of rows written, not counting the header.
pub fn export_budget_csv(db: &Database, budget_id: i64, path: &Path) -> Result<usize> {
    let transactions = db.budget_transactions(budget_id)?;
    // Retired categories included: old transactions may still point at them.
    let keys: HashMap<i64, String> = list_all_categories(db.conn())?
        .into_iter()
        .map(|c| (c.id, c.key))
        .collect();

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    wtr.write_record(HEADER)?;
    for txn in &transactions {
        let category = keys.get(&txn.category_id).map(String::as_str).unwrap_or("");
        wtr.write_record([
            txn.id.to_string(),
            txn.created_at.to_rfc3339(),
            txn.kind.as_str().to_string(),
            category.to_string(),
            txn.description.clone(),
            money::to_column(txn.amount),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    tracing::info!(budget_id, rows = transactions.len(), path = %path.display(), "exported budget");
    Ok(transactions.len())
}
