use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use budgetly::format::{format_amount, format_percentage, truncate};
use budgetly::models::{Allocation, Budget, Category, NewTransaction, Transaction, TransactionChanges, TransactionKind};
use budgetly::{config, export, money, Database, Error};

/// Local-only personal budgeting: one active budget per owner, expenses and
/// income recorded against it.
#[derive(Parser, Debug)]
#[command(name = "budgetly", version, about, long_about = None)]
pub(crate) struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, global = true, env = "BUDGETLY_DB")]
    pub(crate) db: Option<PathBuf>,

    /// Owner id the commands act for. Defaults to the OS user name.
    #[arg(long, global = true, env = "BUDGETLY_OWNER")]
    pub(crate) owner: Option<String>,

    /// Log filter, e.g. `info` or `budgetly=debug`.
    #[arg(long, global = true, env = "BUDGETLY_LOG", default_value = config::DEFAULT_LOG_FILTER)]
    pub(crate) log: String,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Manage budgets
    Budget(BudgetArgs),
    /// Record an expense against a budget
    Spend(EntryArgs),
    /// Record income against a budget
    Earn(EntryArgs),
    /// List, edit and delete transactions
    Tx(TxArgs),
    /// Browse the catalog and manage subscriptions
    Categories(CategoriesArgs),
    /// Subscribe to the default categories
    Onboard,
    /// Spending per category against the plan
    Breakdown(BudgetSelector),
    /// Export a budget's transactions to CSV
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct BudgetArgs {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Start a new budget; the current one is closed
    New {
        name: String,
        #[arg(value_parser = parse_money)]
        amount: Decimal,
        /// Planned amount for a category, as CATEGORY=AMOUNT (repeatable)
        #[arg(long = "plan", value_name = "CATEGORY=AMOUNT", value_parser = parse_allocation)]
        plans: Vec<Allocation>,
    },
    /// List all budgets, newest first
    List,
    /// Show a budget (default: the active one)
    Show(BudgetSelector),
    /// Deactivate a budget (default: the active one)
    Close(BudgetSelector),
    /// Make a budget active again
    Activate { id: i64 },
}

#[derive(Args, Debug)]
pub(crate) struct BudgetSelector {
    /// Budget id (default: the active budget)
    #[arg(long)]
    budget: Option<i64>,
}

#[derive(Args, Debug)]
pub(crate) struct EntryArgs {
    #[arg(value_parser = parse_money)]
    amount: Decimal,
    description: String,
    /// Category key (default: `other` for spending, `income` for earnings)
    #[arg(long, short)]
    category: Option<String>,
    #[command(flatten)]
    target: BudgetSelector,
}

#[derive(Args, Debug)]
pub(crate) struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    /// List live transactions of a budget
    List(BudgetSelector),
    /// Delete a transaction and give its amount back to the budget
    Delete { id: i64 },
    /// Change a transaction's description or category
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Replace a transaction, amount and kind included
    Replace {
        id: i64,
        #[arg(value_parser = parse_kind)]
        kind: TransactionKind,
        #[arg(value_parser = parse_money)]
        amount: Decimal,
        description: String,
        #[arg(long, short)]
        category: Option<String>,
    },
}

#[derive(Args, Debug)]
pub(crate) struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// Categories you are subscribed to
    List,
    /// The whole catalog
    All,
    Subscribe { key: String },
    Unsubscribe { key: String },
    /// Retire a category from the catalog
    Retire { key: String },
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Output file (default: budgetly-<budget id>.csv in the home directory)
    path: Option<PathBuf>,
    #[command(flatten)]
    target: BudgetSelector,
}

fn parse_money(raw: &str) -> std::result::Result<Decimal, String> {
    money::parse_amount(raw).map_err(|e| e.to_string())
}

fn parse_kind(raw: &str) -> std::result::Result<TransactionKind, String> {
    TransactionKind::parse(raw).ok_or_else(|| format!("expected `expense` or `income`, got {raw:?}"))
}

fn parse_allocation(raw: &str) -> std::result::Result<Allocation, String> {
    let (key, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=AMOUNT, got {raw:?}"))?;
    Ok(Allocation::new(key.trim(), parse_money(amount)?))
}

pub(crate) fn run(command: Command, db: &mut Database, owner: &str) -> Result<()> {
    match command {
        Command::Budget(args) => cli_budget(args.command, db, owner),
        Command::Spend(entry) => cli_record(entry, TransactionKind::Expense, db, owner),
        Command::Earn(entry) => cli_record(entry, TransactionKind::Income, db, owner),
        Command::Tx(args) => cli_tx(args.command, db, owner),
        Command::Categories(args) => cli_categories(args.command, db, owner),
        Command::Onboard => {
            let subscriptions = db.seed_default_subscriptions(owner)?;
            println!("Subscribed to {} default categories", subscriptions.len());
            Ok(())
        }
        Command::Breakdown(target) => cli_breakdown(&target, db, owner),
        Command::Export(args) => cli_export(args, db, owner),
    }
}

// ── Budgets ──────────────────────────────────────────────────

fn cli_budget(command: BudgetCommand, db: &mut Database, owner: &str) -> Result<()> {
    match command {
        BudgetCommand::New { name, amount, plans } => {
            let previous = db.active_budget(owner)?;
            let budget = db.create_budget_with_allocations(owner, &name, amount, &plans)?;
            if let Some(old) = previous {
                println!("Closed budget #{} ({})", old.id, old.name);
            }
            println!(
                "Created budget #{} {} with {}",
                budget.id,
                budget.name,
                format_amount(budget.starting_amount)
            );
        }
        BudgetCommand::List => {
            let budgets = db.budgets_for_owner(owner)?;
            if budgets.is_empty() {
                println!("No budgets");
                return Ok(());
            }
            println!("{:<5} {:<24} {:>14} {:>14}  Status", "ID", "Name", "Start", "Left");
            println!("{}", "─".repeat(70));
            for budget in &budgets {
                println!(
                    "{:<5} {:<24} {:>14} {:>14}  {}",
                    budget.id,
                    truncate(&budget.name, 24),
                    format_amount(budget.starting_amount),
                    format_amount(budget.current_amount),
                    if budget.is_active() { "active" } else { "closed" },
                );
            }
        }
        BudgetCommand::Show(target) => {
            let budget = resolve_budget(db, owner, target.budget)?;
            print_budget(&budget);
        }
        BudgetCommand::Close(target) => {
            let budget = resolve_budget(db, owner, target.budget)?;
            let closed = db.deactivate_budget(&budget)?;
            println!("Closed budget #{} ({})", closed.id, closed.name);
        }
        BudgetCommand::Activate { id } => {
            let budget = owned_budget(db, owner, id)?;
            let active = db.activate_budget(&budget)?;
            println!("Budget #{} ({}) is now active", active.id, active.name);
        }
    }
    Ok(())
}

fn print_budget(budget: &Budget) {
    let status = if budget.is_active() { "active" } else { "closed" };
    println!("#{} {} ({status})", budget.id, budget.name);
    println!("{}", "─".repeat(40));
    println!("  Started with: {}", format_amount(budget.starting_amount));
    println!("  Left:         {}", format_amount(budget.current_amount));
    println!(
        "  Spent:        {} ({})",
        format_amount(budget.spent_amount()),
        format_percentage(budget.spent_percentage())
    );
    if budget.is_over_budget() {
        println!("  Over budget by {}", format_amount(-budget.current_amount));
    }
}

// ── Transactions ─────────────────────────────────────────────

fn cli_record(entry: EntryArgs, kind: TransactionKind, db: &mut Database, owner: &str) -> Result<()> {
    let budget = resolve_budget(db, owner, entry.target.budget)?;
    let new = NewTransaction {
        budget_id: budget.id,
        category_key: entry.category.unwrap_or_else(|| default_category(kind).to_string()),
        kind,
        description: entry.description,
        amount: entry.amount,
    };
    let txn = db.create_transaction(&new)?;
    let budget = db.get_budget(budget.id)?;
    println!(
        "Recorded {} #{}: {} ({} left)",
        txn.kind,
        txn.id,
        format_amount(txn.amount),
        format_amount(budget.current_amount)
    );
    Ok(())
}

fn default_category(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "other",
        TransactionKind::Income => "income",
    }
}

fn cli_tx(command: TxCommand, db: &mut Database, owner: &str) -> Result<()> {
    match command {
        TxCommand::List(target) => {
            let budget = resolve_budget(db, owner, target.budget)?;
            let transactions = db.budget_transactions(budget.id)?;
            if transactions.is_empty() {
                println!("No transactions in {}", budget.name);
                return Ok(());
            }
            let categories = db.categories()?;
            println!(
                "{:<6} {:<10} {:<8} {:<16} {:<28} {:>12}",
                "ID", "Date", "Kind", "Category", "Description", "Amount"
            );
            println!("{}", "─".repeat(85));
            for txn in &transactions {
                let category = Category::find_by_id(&categories, txn.category_id)
                    .map(|c| c.label.as_str())
                    .unwrap_or("(retired)");
                println!(
                    "{:<6} {:<10} {:<8} {:<16} {:<28} {:>12}",
                    txn.id,
                    txn.created_at.format("%Y-%m-%d").to_string(),
                    txn.kind.as_str(),
                    truncate(category, 16),
                    truncate(&txn.description, 28),
                    format_amount(txn.balance_effect()),
                );
            }
        }
        TxCommand::Delete { id } => {
            let txn = owned_transaction(db, owner, id)?;
            db.delete_transaction(txn.id)?;
            println!("Deleted #{}: {}", txn.id, txn.description);
        }
        TxCommand::Edit {
            id,
            description,
            category,
        } => {
            let txn = owned_transaction(db, owner, id)?;
            let changes = TransactionChanges {
                description,
                category_key: category,
            };
            if changes.is_empty() {
                anyhow::bail!("Nothing to change; pass --description and/or --category");
            }
            let updated = db.update_transaction(&txn, &changes)?;
            println!("Updated #{}: {}", updated.id, updated.description);
        }
        TxCommand::Replace {
            id,
            kind,
            amount,
            description,
            category,
        } => {
            let old = owned_transaction(db, owner, id)?;
            let category_key = match category {
                Some(key) => key,
                None => category_key_of(db, &old)?,
            };
            let new = NewTransaction {
                budget_id: old.budget_id,
                category_key,
                kind,
                description,
                amount,
            };
            let txn = db.replace_transaction(old.id, &new)?;
            println!("Replaced #{} with #{}", old.id, txn.id);
        }
    }
    Ok(())
}

fn category_key_of(db: &Database, txn: &Transaction) -> Result<String> {
    Category::find_by_id(&db.categories()?, txn.category_id)
        .map(|c| c.key.clone())
        .ok_or_else(|| Error::NotFound(format!("category {}", txn.category_id)).into())
}

// ── Categories ───────────────────────────────────────────────

fn cli_categories(command: CategoriesCommand, db: &mut Database, owner: &str) -> Result<()> {
    match command {
        CategoriesCommand::List => {
            let categories = db.active_categories_for_owner(owner)?;
            if categories.is_empty() {
                println!("No categories yet; run `budgetly onboard` or `budgetly categories subscribe <key>`");
            }
            for category in &categories {
                println!("{} {:<16} {}", category.icon, category.key, category.label);
            }
        }
        CategoriesCommand::All => {
            let mine: Vec<i64> = db
                .active_categories_for_owner(owner)?
                .iter()
                .map(|c| c.id)
                .collect();
            for category in db.categories()? {
                let marker = if mine.contains(&category.id) { "*" } else { " " };
                println!("{marker} {} {:<16} {}", category.icon, category.key, category.label);
            }
        }
        CategoriesCommand::Subscribe { key } => {
            let category = db.category_by_key(&key)?;
            db.subscribe(owner, category.id)?;
            println!("Subscribed to {category}");
        }
        CategoriesCommand::Unsubscribe { key } => {
            let category = db.category_by_key(&key)?;
            db.unsubscribe(owner, category.id)?;
            println!("Unsubscribed from {category}");
        }
        CategoriesCommand::Retire { key } => {
            let category = db.retire_category(&key)?;
            println!("Retired {category}");
        }
    }
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_breakdown(target: &BudgetSelector, db: &Database, owner: &str) -> Result<()> {
    let budget = resolve_budget(db, owner, target.budget)?;
    let rows = db.budget_breakdown(budget.id)?;
    print_budget(&budget);
    if rows.is_empty() {
        return Ok(());
    }
    println!();
    println!("{:<22} {:>14} {:>14} {:>14}", "Category", "Spent", "Planned", "Remaining");
    println!("{}", "─".repeat(67));
    for row in &rows {
        let planned = row.planned.map(format_amount).unwrap_or_else(|| "-".into());
        let remaining = row.remaining().map(format_amount).unwrap_or_else(|| "-".into());
        println!(
            "{:<22} {:>14} {:>14} {:>14}",
            truncate(&format!("{} {}", row.icon, row.label), 22),
            format_amount(row.spent),
            planned,
            remaining,
        );
    }
    Ok(())
}

fn cli_export(args: ExportArgs, db: &Database, owner: &str) -> Result<()> {
    let budget = resolve_budget(db, owner, args.target.budget)?;
    let path = match args.path {
        Some(path) => path,
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(format!("budgetly-{}.csv", budget.id))
        }
    };
    let count = export::export_budget_csv(db, budget.id, &path)
        .with_context(|| format!("Export of budget #{} failed", budget.id))?;
    if count == 0 {
        println!("No transactions in {}", budget.name);
    } else {
        println!("Exported {count} transactions to {}", path.display());
    }
    Ok(())
}

// ── Lookup helpers ───────────────────────────────────────────

/// The given budget if the owner has it, else the owner's active budget.
fn resolve_budget(db: &Database, owner: &str, id: Option<i64>) -> Result<Budget> {
    match id {
        Some(id) => Ok(owned_budget(db, owner, id)?),
        None => db.active_budget(owner)?.ok_or_else(|| {
            anyhow::anyhow!("No active budget; create one with `budgetly budget new <name> <amount>`")
        }),
    }
}

/// Budgets of other owners are reported as missing.
fn owned_budget(db: &Database, owner: &str, id: i64) -> budgetly::Result<Budget> {
    let budget = db.get_budget(id)?;
    if budget.owner_id != owner {
        return Err(Error::NotFound(format!("budget {id}")));
    }
    Ok(budget)
}

/// Transactions on budgets of other owners are reported as missing. Storage
/// failures pass through unchanged.
fn owned_transaction(db: &Database, owner: &str, id: i64) -> budgetly::Result<Transaction> {
    let txn = db.get_transaction(id)?;
    match owned_budget(db, owner, txn.budget_id) {
        Ok(_) => Ok(txn),
        Err(Error::NotFound(_)) => Err(Error::NotFound(format!("transaction {id}"))),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests;
