use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use ledger::{
    Amount, BalanceTarget, CategoryKind, CreateTransactionCmd, DateRange, Ledger, TransactionKind,
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

struct Fixture {
    account_id: Uuid,
    other_id: Uuid,
    salary: Uuid,
    food: Uuid,
}

async fn fixture(ledger: &Ledger) -> Fixture {
    Fixture {
        account_id: ledger.new_account("alice", "Checking").await.unwrap(),
        other_id: ledger.new_account("alice", "Savings").await.unwrap(),
        salary: ledger
            .new_category("alice", "Salary", CategoryKind::Income, true)
            .await
            .unwrap(),
        food: ledger
            .new_category("alice", "Food", CategoryKind::Expense, true)
            .await
            .unwrap(),
    }
}

#[tokio::test]
async fn summary_reports_zero_for_absent_kinds() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(100_00),
                Utc::now(),
            )
            .account(fx.account_id)
            .category(fx.salary),
        )
        .await
        .unwrap();

    let summary = ledger.transaction_summary("alice", None).await.unwrap();
    assert_eq!(summary.total_income, Amount::new(100_00));
    assert_eq!(summary.total_expenses, Amount::ZERO);
    assert_eq!(summary.total_transfers, Amount::ZERO);
    assert_eq!(summary.net_amount, Amount::new(100_00));
    assert_eq!(summary.count, 1);

    // A user with no transactions gets an all-zero summary, not an error.
    let empty = ledger.transaction_summary("bob", None).await.unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.net_amount, Amount::ZERO);
}

#[tokio::test]
async fn summary_nets_income_against_expenses() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(100_00),
                Utc::now(),
            )
            .account(fx.account_id)
            .category(fx.salary),
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Expense,
                Amount::new(30_00),
                Utc::now(),
            )
            .account(fx.account_id)
            .category(fx.food),
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Transfer,
                Amount::new(20_00),
                Utc::now(),
            )
            .account(fx.account_id)
            .transfer_to(BalanceTarget::account(fx.other_id)),
        )
        .await
        .unwrap();

    let summary = ledger.transaction_summary("alice", None).await.unwrap();
    assert_eq!(summary.total_income, Amount::new(100_00));
    assert_eq!(summary.total_expenses, Amount::new(30_00));
    assert_eq!(summary.total_transfers, Amount::new(20_00));
    assert_eq!(summary.net_amount, Amount::new(70_00));
    assert_eq!(summary.count, 3);
}

#[tokio::test]
async fn summary_range_is_half_open() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;

    let in_july = Utc.with_ymd_and_hms(2026, 7, 20, 9, 0, 0).unwrap();
    let first_of_august = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(40_00),
                in_july,
            )
            .account(fx.account_id)
            .category(fx.salary),
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(60_00),
                first_of_august,
            )
            .account(fx.account_id)
            .category(fx.salary),
        )
        .await
        .unwrap();

    let july = DateRange::calendar_month(2026, 7).unwrap();
    let summary = ledger
        .transaction_summary("alice", Some(&july))
        .await
        .unwrap();
    assert_eq!(summary.total_income, Amount::new(40_00));
    assert_eq!(summary.count, 1);

    let monthly = ledger.monthly_summary("alice", 2026, 8).await.unwrap();
    assert_eq!(monthly.total_income, Amount::new(60_00));
    assert_eq!(monthly.count, 1);
}

#[tokio::test]
async fn total_balance_sums_the_accounts() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(100_00),
                Utc::now(),
            )
            .account(fx.account_id)
            .category(fx.salary),
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(50_00),
                Utc::now(),
            )
            .account(fx.other_id)
            .category(fx.salary),
        )
        .await
        .unwrap();

    assert_eq!(
        ledger.total_balance("alice").await.unwrap(),
        Amount::new(150_00)
    );
    assert_eq!(ledger.total_balance("bob").await.unwrap(), Amount::ZERO);
}

#[tokio::test]
async fn credit_overview_tracks_debt_and_utilization() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;
    let visa = ledger
        .new_credit_card("alice", "Visa", Amount::new(1000_00), 10, 3)
        .await
        .unwrap();
    let amex = ledger
        .new_credit_card("alice", "Amex", Amount::new(1000_00), 15, 8)
        .await
        .unwrap();

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Expense,
                Amount::new(500_00),
                Utc::now(),
            )
            .card(visa)
            .category(fx.food),
        )
        .await
        .unwrap();
    // A card in credit owes nothing and must not offset the other's debt.
    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Income,
                Amount::new(100_00),
                Utc::now(),
            )
            .card(amex)
            .category(fx.salary),
        )
        .await
        .unwrap();

    let overview = ledger.credit_overview("alice").await.unwrap();
    assert_eq!(overview.total_debt, Amount::new(500_00));
    assert_eq!(overview.total_limit, Amount::new(2000_00));
    assert_eq!(overview.available_credit, Amount::new(1500_00));
    assert!((overview.utilization - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn credit_overview_with_no_cards_is_all_zero() {
    let (ledger, _db) = ledger_with_db().await;

    let overview = ledger.credit_overview("alice").await.unwrap();
    assert_eq!(overview.total_debt, Amount::ZERO);
    assert_eq!(overview.total_limit, Amount::ZERO);
    assert_eq!(overview.available_credit, Amount::ZERO);
    assert_eq!(overview.utilization, 0.0);
}

#[tokio::test]
async fn zero_limit_cards_report_zero_utilization() {
    let (ledger, _db) = ledger_with_db().await;
    let fx = fixture(&ledger).await;
    let card_id = ledger
        .new_credit_card("alice", "Prepaid", Amount::ZERO, 10, 3)
        .await
        .unwrap();

    ledger
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                TransactionKind::Expense,
                Amount::new(25_00),
                Utc::now(),
            )
            .card(card_id)
            .category(fx.food),
        )
        .await
        .unwrap();

    let overview = ledger.credit_overview("alice").await.unwrap();
    assert_eq!(overview.total_debt, Amount::new(25_00));
    assert_eq!(overview.total_limit, Amount::ZERO);
    assert_eq!(overview.utilization, 0.0);
}
