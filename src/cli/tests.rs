#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn setup() -> (Database, Transaction) {
    let mut db = Database::open_in_memory().unwrap();
    let budget = db.create_budget("alice", "Jan", dec!(300)).unwrap();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Bread", dec!(4)))
        .unwrap();
    (db, txn)
}

#[test]
fn test_owned_lookups_for_owner() {
    let (db, txn) = setup();
    assert_eq!(owned_budget(&db, "alice", txn.budget_id).unwrap().id, txn.budget_id);
    assert_eq!(owned_transaction(&db, "alice", txn.id).unwrap(), txn);
}

#[test]
fn test_other_owner_sees_not_found() {
    let (db, txn) = setup();
    assert!(matches!(
        owned_budget(&db, "bob", txn.budget_id),
        Err(Error::NotFound(_))
    ));
    let err = owned_transaction(&db, "bob", txn.id).unwrap_err();
    assert!(matches!(&err, Error::NotFound(what) if *what == format!("transaction {}", txn.id)));
    assert!(matches!(
        owned_transaction(&db, "alice", 999),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_storage_failure_is_not_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budgetly.db");
    let mut db = Database::open(&path).unwrap();
    let budget = db.create_budget("alice", "Jan", dec!(300)).unwrap();
    let txn = db
        .create_transaction(&NewTransaction::expense(budget.id, "groceries", "Bread", dec!(4)))
        .unwrap();

    rusqlite::Connection::open(&path)
        .unwrap()
        .execute(
            "UPDATE budgets SET current_amount = 'lots' WHERE id = ?1",
            [budget.id],
        )
        .unwrap();

    assert!(matches!(
        owned_transaction(&db, "alice", txn.id),
        Err(Error::Persistence(_))
    ));
    assert!(matches!(
        owned_budget(&db, "bob", budget.id),
        Err(Error::Persistence(_))
    ));
}

#[test]
fn test_parse_allocation() {
    let allocation = parse_allocation(" groceries =$1,200.50").unwrap();
    assert_eq!(allocation.category_key, "groceries");
    assert_eq!(allocation.planned_amount, dec!(1200.50));
    assert!(parse_allocation("groceries").is_err());
    assert!(parse_allocation("groceries=lots").is_err());
}
