use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use ledger::{
    Amount, BalanceTarget, CategoryKind, CreateTransactionCmd, CreditCardPatch, CategoryPatch,
    Ledger, LedgerError, TransactionKind,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

async fn expense_on(ledger: &Ledger, account_id: Uuid, category_id: Uuid) -> Uuid {
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Expense,
                Amount::new(10_00),
                Utc::now(),
            )
            .account(account_id)
            .category(category_id),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn account_deletion_is_guarded_by_references() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = ledger.new_account("alice", "Checking").await.unwrap();
    let food = ledger
        .new_category("alice", "Food", CategoryKind::Expense, true)
        .await
        .unwrap();
    let tx_id = expense_on(&ledger, account_id, food).await;

    let err = ledger.delete_account("alice", account_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::EntityInUse(_)));

    assert!(ledger.delete_transaction("alice", tx_id).await.unwrap());
    assert!(ledger.delete_account("alice", account_id).await.unwrap());

    let err = ledger.account("alice", account_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn transfer_target_side_also_blocks_deletion() {
    let (ledger, _db) = ledger_with_db().await;
    let from = ledger.new_account("alice", "Checking").await.unwrap();
    let to = ledger.new_account("alice", "Savings").await.unwrap();

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Transfer,
                Amount::new(10_00),
                Utc::now(),
            )
            .account(from)
            .transfer_to(BalanceTarget::account(to)),
        )
        .await
        .unwrap();

    let err = ledger.delete_account("alice", to).await.unwrap_err();
    assert!(matches!(err, LedgerError::EntityInUse(_)));
}

#[tokio::test]
async fn credit_card_deletion_is_guarded_by_references() {
    let (ledger, _db) = ledger_with_db().await;
    let card_id = ledger
        .new_credit_card("alice", "Visa", Amount::new(500_00), 10, 3)
        .await
        .unwrap();
    let food = ledger
        .new_category("alice", "Food", CategoryKind::Expense, true)
        .await
        .unwrap();

    let tx = ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Expense,
                Amount::new(10_00),
                Utc::now(),
            )
            .card(card_id)
            .category(food),
        )
        .await
        .unwrap();

    let err = ledger
        .delete_credit_card("alice", card_id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EntityInUse(_)));

    assert!(ledger.delete_transaction("alice", tx.id).await.unwrap());
    assert!(ledger.delete_credit_card("alice", card_id).await.unwrap());
}

#[tokio::test]
async fn category_deletion_is_guarded_by_references() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = ledger.new_account("alice", "Checking").await.unwrap();
    let food = ledger
        .new_category("alice", "Food", CategoryKind::Expense, true)
        .await
        .unwrap();
    let tx_id = expense_on(&ledger, account_id, food).await;

    let err = ledger.delete_category("alice", food).await.unwrap_err();
    assert!(matches!(err, LedgerError::EntityInUse(_)));

    assert!(ledger.delete_transaction("alice", tx_id).await.unwrap());
    assert!(ledger.delete_category("alice", food).await.unwrap());
}

#[tokio::test]
async fn deleting_missing_entities_returns_false() {
    let (ledger, _db) = ledger_with_db().await;

    assert!(!ledger.delete_account("alice", Uuid::new_v4()).await.unwrap());
    assert!(!ledger
        .delete_credit_card("alice", Uuid::new_v4())
        .await
        .unwrap());
    assert!(!ledger
        .delete_category("alice", Uuid::new_v4())
        .await
        .unwrap());
}

#[tokio::test]
async fn cross_user_entities_resolve_as_missing() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = ledger.new_account("alice", "Checking").await.unwrap();

    let err = ledger.account("bob", account_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));

    // Not an ownership error: the other user's id behaves like a missing one.
    assert!(!ledger.delete_account("bob", account_id).await.unwrap());
    assert!(ledger.account("alice", account_id).await.is_ok());
}

#[tokio::test]
async fn duplicate_names_are_rejected_per_owner() {
    let (ledger, _db) = ledger_with_db().await;
    ledger.new_account("alice", "Checking").await.unwrap();

    let err = ledger.new_account("alice", "checking").await.unwrap_err();
    assert!(matches!(err, LedgerError::ExistingName(_)));

    // Another owner can reuse the name.
    ledger.new_account("bob", "Checking").await.unwrap();

    ledger
        .new_category("alice", "Food", CategoryKind::Expense, true)
        .await
        .unwrap();
    let err = ledger
        .new_category("alice", "FOOD", CategoryKind::Income, true)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ExistingName(_)));

    ledger
        .new_credit_card("alice", "Visa", Amount::new(500_00), 10, 3)
        .await
        .unwrap();
    let err = ledger
        .new_credit_card("alice", " visa ", Amount::new(500_00), 10, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ExistingName(_)));
}

#[tokio::test]
async fn rename_account_checks_the_new_name() {
    let (ledger, _db) = ledger_with_db().await;
    let checking = ledger.new_account("alice", "Checking").await.unwrap();
    ledger.new_account("alice", "Savings").await.unwrap();

    ledger
        .rename_account("alice", checking, "Daily")
        .await
        .unwrap();
    assert_eq!(ledger.account("alice", checking).await.unwrap().name, "Daily");

    let err = ledger
        .rename_account("alice", checking, "savings")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ExistingName(_)));

    let err = ledger.new_account("alice", "   ").await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidName(_)));
}

#[tokio::test]
async fn credit_card_patch_updates_only_supplied_fields() {
    let (ledger, _db) = ledger_with_db().await;
    let card_id = ledger
        .new_credit_card("alice", "Visa", Amount::new(500_00), 10, 3)
        .await
        .unwrap();

    let card = ledger
        .update_credit_card(
            "alice",
            card_id,
            CreditCardPatch::new()
                .limit_value(Amount::new(800_00))
                .paid(true),
        )
        .await
        .unwrap();
    assert_eq!(card.name, "Visa");
    assert_eq!(card.limit_value, Amount::new(800_00));
    assert_eq!(card.due_day, 10);
    assert!(card.paid);

    let err = ledger
        .update_credit_card("alice", card_id, CreditCardPatch::new().due_day(32))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let err = ledger
        .new_credit_card("alice", "Amex", Amount::new(-1), 10, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn category_listing_filters_kind_and_visibility() {
    let (ledger, _db) = ledger_with_db().await;
    let food = ledger
        .new_category("alice", "Food", CategoryKind::Expense, true)
        .await
        .unwrap();
    ledger
        .new_category("alice", "Salary", CategoryKind::Income, true)
        .await
        .unwrap();
    let legacy = ledger
        .new_category("alice", "Legacy", CategoryKind::Expense, false)
        .await
        .unwrap();

    let expenses = ledger
        .list_categories("alice", Some(CategoryKind::Expense), false)
        .await
        .unwrap();
    let ids: Vec<_> = expenses.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![food, legacy]);

    let visible = ledger
        .list_categories("alice", Some(CategoryKind::Expense), true)
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, food);

    let hidden = ledger
        .update_category("alice", food, CategoryPatch::new().visible(false))
        .await
        .unwrap();
    assert!(!hidden.visible);
    let visible = ledger
        .list_categories("alice", Some(CategoryKind::Expense), true)
        .await
        .unwrap();
    assert!(visible.is_empty());
}
