#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::TransactionKind;

fn setup() -> (Database, Budget) {
    let mut db = Database::open_in_memory().unwrap();
    let budget = db.create_budget("u1", "Feb", dec!(1000)).unwrap();
    (db, budget)
}

fn transaction_rows(db: &Database) -> i64 {
    db.conn()
        .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
        .unwrap()
}

/// starting - live expenses + live incomes, computed from the rows.
fn reconciled_amount(db: &Database, budget_id: i64) -> Decimal {
    let budget = db.get_budget(budget_id).unwrap();
    let net: Decimal = db
        .budget_transactions(budget_id)
        .unwrap()
        .iter()
        .map(|t| t.balance_effect())
        .sum();
    budget.starting_amount + net
}

// ── create_transaction ────────────────────────────────────────

#[test]
fn test_expense_then_delete_restores_balance() {
    let (mut db, budget) = setup();
    assert_eq!(budget.current_amount, dec!(1000));
    assert!(budget.is_active());

    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    assert_eq!(txn.kind, TransactionKind::Expense);
    assert_eq!(txn.amount, dec!(150));
    assert_eq!(txn.description, "Food");
    assert!(!txn.is_deleted());
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(850));

    db.delete_transaction(txn.id).unwrap();
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
    assert!(db.get_transaction(txn.id).unwrap().is_deleted());
    assert!(db.budget_transactions(budget.id).unwrap().is_empty());
}

#[test]
fn test_income_raises_balance() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::income(budget.id, "income", "Refund", dec!(40.50)))
        .unwrap();
    assert_eq!(txn.kind, TransactionKind::Income);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1040.50));

    db.delete_transaction(txn.id).unwrap();
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_amount_stored_positive_with_cents() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(12.5)))
        .unwrap();
    let stored: String = db
        .conn()
        .query_row(
            "SELECT amount FROM transactions WHERE id = ?1",
            [txn.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "12.50");
    let balance: String = db
        .conn()
        .query_row(
            "SELECT current_amount FROM budgets WHERE id = ?1",
            [budget.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(balance, "987.50");
}

#[test]
fn test_create_against_inactive_budget() {
    let (mut db, budget) = setup();
    db.deactivate_budget(&budget).unwrap();

    let err = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(10)))
        .unwrap_err();
    assert!(matches!(err, Error::BudgetNotActive(id) if id == budget.id));
    assert_eq!(transaction_rows(&db), 0);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_create_against_superseded_budget() {
    let (mut db, jan) = setup();
    db.create_budget("u1", "Mar", dec!(10)).unwrap();
    assert!(matches!(
        db.create_transaction(&NewTransaction::expense(jan.id, "groceries", "Food", dec!(10))),
        Err(Error::BudgetNotActive(_))
    ));
}

#[test]
fn test_create_against_missing_budget() {
    let (mut db, _) = setup();
    assert!(matches!(
        db.create_transaction(&NewTransaction::expense(404, "groceries", "Food", dec!(10))),
        Err(Error::NotFound(_))
    ));
    assert_eq!(transaction_rows(&db), 0);
}

#[test]
fn test_create_validation() {
    let (mut db, budget) = setup();
    for amount in [Decimal::ZERO, dec!(-3), dec!(0.005)] {
        let err = db
            .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", amount))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{amount} accepted");
    }
    let err = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "  ", dec!(5)))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(transaction_rows(&db), 0);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_inactive_checked_before_validation() {
    let (mut db, budget) = setup();
    db.deactivate_budget(&budget).unwrap();
    assert!(matches!(
        db.create_transaction(&NewTransaction::expense(budget.id, "groceries", "", Decimal::ZERO)),
        Err(Error::BudgetNotActive(_))
    ));
}

#[test]
fn test_create_with_unknown_or_retired_category() {
    let (mut db, budget) = setup();
    assert!(matches!(
        db.create_transaction(&NewTransaction::expense(budget.id, "yachts", "Boat", dec!(10))),
        Err(Error::NotFound(_))
    ));

    db.retire_category("travel").unwrap();
    assert!(matches!(
        db.create_transaction(&NewTransaction::expense(budget.id, "travel", "Trip", dec!(10))),
        Err(Error::NotFound(_))
    ));
    assert_eq!(transaction_rows(&db), 0);
}

#[test]
fn test_category_key_is_case_insensitive() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, " Groceries ", "Food", dec!(1)))
        .unwrap();
    assert_eq!(
        txn.category_id,
        db.category_by_key("groceries").unwrap().id
    );
}

#[test]
fn test_create_rejects_oversized_amount() {
    let (mut db, budget) = setup();
    for amount in [dec!(1000000000000), dec!(70000000000000000000000000000)] {
        let err = db
            .create_transaction(&NewTransaction::income(budget.id, "income", "Windfall", amount))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{amount} accepted");
    }
    assert_eq!(transaction_rows(&db), 0);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_largest_amounts_reconcile() {
    let mut db = Database::open_in_memory().unwrap();
    let budget = db.create_budget("u1", "Big", money::max_amount()).unwrap();
    for _ in 0..3 {
        db.create_transaction(&NewTransaction::expense(
            budget.id,
            "housing",
            "Castle",
            money::max_amount(),
        ))
        .unwrap();
    }
    let budget = db.get_budget(budget.id).unwrap();
    assert_eq!(budget.current_amount, dec!(-1999999999999.98));
    assert_eq!(budget.current_amount, reconciled_amount(&db, budget.id));
    assert_eq!(budget.spent_percentage(), dec!(300));
}

#[test]
fn test_balance_overflow_rolls_back_transaction() {
    let (mut db, budget) = setup();
    db.conn()
        .execute(
            "UPDATE budgets SET current_amount = ?1 WHERE id = ?2",
            rusqlite::params![money::max_balance().to_string(), budget.id],
        )
        .unwrap();

    let err = db
        .create_transaction(&NewTransaction::income(budget.id, "income", "Bonus", dec!(1)))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(transaction_rows(&db), 0);
    assert_eq!(
        db.get_budget(budget.id).unwrap().current_amount,
        money::max_balance()
    );
}

// ── atomicity ─────────────────────────────────────────────────

fn fail_balance_updates(db: &Database) {
    db.conn()
        .execute_batch(
            "CREATE TRIGGER fail_balance BEFORE UPDATE OF current_amount ON budgets
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
        )
        .unwrap();
}

#[test]
fn test_failed_balance_update_leaves_no_transaction() {
    let (mut db, budget) = setup();
    fail_balance_updates(&db);

    let err = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert_eq!(transaction_rows(&db), 0);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_failed_balance_update_keeps_transaction_live() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    fail_balance_updates(&db);

    assert!(matches!(
        db.delete_transaction(txn.id),
        Err(Error::Persistence(_))
    ));
    assert!(!db.get_transaction(txn.id).unwrap().is_deleted());
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(850));
}

// ── delete_transaction ────────────────────────────────────────

#[test]
fn test_delete_twice_is_not_found() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    db.delete_transaction(txn.id).unwrap();

    assert!(matches!(db.delete_transaction(txn.id), Err(Error::NotFound(_))));
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1000));
}

#[test]
fn test_delete_missing() {
    let (mut db, _) = setup();
    assert!(matches!(db.delete_transaction(12), Err(Error::NotFound(_))));
}

#[test]
fn test_delete_on_closed_budget_still_reverses() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    db.create_budget("u1", "Mar", dec!(500)).unwrap();

    db.delete_transaction(txn.id).unwrap();
    let feb = db.get_budget(budget.id).unwrap();
    assert!(!feb.is_active());
    assert_eq!(feb.current_amount, dec!(1000));
}

// ── reconciliation ────────────────────────────────────────────

#[test]
fn test_reconciliation_over_mixed_sequence() {
    let (mut db, budget) = setup();
    let steps = [
        (TransactionKind::Expense, dec!(150)),
        (TransactionKind::Income, dec!(20.25)),
        (TransactionKind::Expense, dec!(999.99)),
        (TransactionKind::Expense, dec!(0.01)),
        (TransactionKind::Income, dec!(300)),
        (TransactionKind::Expense, dec!(75.40)),
    ];

    let mut ids = Vec::new();
    for (i, (kind, amount)) in steps.iter().enumerate() {
        let new = NewTransaction {
            budget_id: budget.id,
            category_key: "other".into(),
            kind: *kind,
            description: format!("step {i}"),
            amount: *amount,
        };
        ids.push(db.create_transaction(&new).unwrap().id);
        let current = db.get_budget(budget.id).unwrap().current_amount;
        assert_eq!(current, reconciled_amount(&db, budget.id));
    }

    for id in [ids[2], ids[4], ids[0]] {
        db.delete_transaction(id).unwrap();
        let current = db.get_budget(budget.id).unwrap().current_amount;
        assert_eq!(current, reconciled_amount(&db, budget.id));
    }

    // Left: +20.25 - 0.01 - 75.40
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(944.84));
}

#[test]
fn test_overspending_goes_negative() {
    let (mut db, budget) = setup();
    db.create_transaction(&NewTransaction::expense(budget.id, "housing", "Rent", dec!(1200)))
        .unwrap();
    let budget = db.get_budget(budget.id).unwrap();
    assert_eq!(budget.current_amount, dec!(-200));
    assert!(budget.is_over_budget());
    assert_eq!(budget.spent_amount(), dec!(1200));
}

// ── update / replace ──────────────────────────────────────────

#[test]
fn test_update_description_and_category() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();

    let changes = TransactionChanges {
        description: Some("  Dinner out ".into()),
        category_key: Some("restaurants".into()),
    };
    let updated = db.update_transaction(&txn, &changes).unwrap();
    assert_eq!(updated.description, "Dinner out");
    assert_eq!(
        updated.category_id,
        db.category_by_key("restaurants").unwrap().id
    );
    assert_eq!(updated.amount, txn.amount);
    assert_eq!(updated.kind, txn.kind);
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(850));
}

#[test]
fn test_update_without_changes_is_noop() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    let same = db
        .update_transaction(&txn, &TransactionChanges::default())
        .unwrap();
    assert_eq!(same, txn);
}

#[test]
fn test_update_rejects_bad_changes() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();

    let blank = TransactionChanges {
        description: Some(" ".into()),
        ..Default::default()
    };
    assert!(matches!(
        db.update_transaction(&txn, &blank),
        Err(Error::Validation(_))
    ));

    let unknown = TransactionChanges {
        category_key: Some("yachts".into()),
        ..Default::default()
    };
    assert!(matches!(
        db.update_transaction(&txn, &unknown),
        Err(Error::NotFound(_))
    ));
    assert_eq!(db.get_transaction(txn.id).unwrap().description, "Food");
}

#[test]
fn test_update_deleted_transaction() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();
    db.delete_transaction(txn.id).unwrap();

    let changes = TransactionChanges {
        description: Some("Late edit".into()),
        ..Default::default()
    };
    assert!(matches!(
        db.update_transaction(&txn, &changes),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_replace_changes_amount_and_kind() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();

    let replacement = db
        .replace_transaction(
            txn.id,
            &NewTransaction::income(budget.id, "income", "Actually a refund", dec!(60)),
        )
        .unwrap();

    assert_ne!(replacement.id, txn.id);
    assert!(db.get_transaction(txn.id).unwrap().is_deleted());
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(1060));
    assert_eq!(
        db.get_budget(budget.id).unwrap().current_amount,
        reconciled_amount(&db, budget.id)
    );
}

#[test]
fn test_replace_failure_rolls_back_reversal() {
    let (mut db, budget) = setup();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Food", dec!(150)))
        .unwrap();

    let err = db
        .replace_transaction(
            txn.id,
            &NewTransaction::expense(budget.id, "groceries", "Food", Decimal::ZERO),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!db.get_transaction(txn.id).unwrap().is_deleted());
    assert_eq!(db.get_budget(budget.id).unwrap().current_amount, dec!(850));
    assert_eq!(transaction_rows(&db), 1);
}

#[test]
fn test_budget_transactions_newest_first() {
    let (mut db, budget) = setup();
    for description in ["first", "second", "third"] {
        db.create_transaction(&NewTransaction::expense(budget.id, "other", description, dec!(1)))
            .unwrap();
    }
    let descriptions: Vec<String> = db
        .budget_transactions(budget.id)
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(descriptions, vec!["third", "second", "first"]);
    assert!(matches!(
        db.budget_transactions(99),
        Err(Error::NotFound(_))
    ));
}
