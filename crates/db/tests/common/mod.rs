//! Shared fixtures for repository integration tests.
//!
//! Each test gets its own in-memory SQLite database with migrations applied,
//! a small chart of accounts and the January 2025 period.

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)]

use chrono::NaiveDate;
use neraca_core::LedgerSettings;
use neraca_core::account::AccountType;
use neraca_core::ledger::{LedgerEntryInput, LedgerLineInput};
use neraca_db::entities::{accounts, periods};
use neraca_db::migration::{Migrator, MigratorTrait};
use neraca_db::repositories::{CreateAccountInput, CreatePeriodInput};
use neraca_db::{Repositories, connect_with};
use neraca_shared::DatabaseConfig;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

pub struct TestLedger {
    pub db: DatabaseConnection,
    pub repos: Repositories,
    /// 1100 Cash, debit normal.
    pub cash: accounts::Model,
    /// 1200 Accounts Receivable, debit normal.
    pub receivable: accounts::Model,
    /// 2100 Accounts Payable, credit normal.
    pub payable: accounts::Model,
    /// 4100 Sales, credit normal.
    pub sales: accounts::Model,
    /// 2025-01-01..=2025-01-31, open.
    pub jan: periods::Model,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn connect_memory() -> DatabaseConnection {
    let mut config = DatabaseConfig::with_url("sqlite::memory:");
    config.max_connections = 1;
    config.min_connections = 1;
    config.acquire_timeout_secs = 5;
    let db = connect_with(&config).await.expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub async fn setup() -> TestLedger {
    setup_with(LedgerSettings::default()).await
}

pub async fn setup_with(settings: LedgerSettings) -> TestLedger {
    let db = connect_memory().await;
    let repos = Repositories::new(db.clone(), settings);

    let cash = create_account(&repos, "1100", "Cash", AccountType::Asset).await;
    let receivable = create_account(&repos, "1200", "Accounts Receivable", AccountType::Asset).await;
    let payable = create_account(&repos, "2100", "Accounts Payable", AccountType::Liability).await;
    let sales = create_account(&repos, "4100", "Sales", AccountType::Revenue).await;

    let jan = create_period(&repos, "January 2025", date(2025, 1, 1), date(2025, 1, 31)).await;

    TestLedger {
        db,
        repos,
        cash,
        receivable,
        payable,
        sales,
        jan,
    }
}

pub async fn create_account(
    repos: &Repositories,
    code: &str,
    name: &str,
    account_type: AccountType,
) -> accounts::Model {
    repos
        .accounts
        .create(CreateAccountInput {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            normal_balance: None,
        })
        .await
        .expect("create account")
}

pub async fn create_period(
    repos: &Repositories,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> periods::Model {
    repos
        .periods
        .create(CreatePeriodInput {
            name: name.to_string(),
            start_date,
            end_date,
        })
        .await
        .expect("create period")
}

/// A two-line entry debiting `debit_account` and crediting `credit_account`.
pub fn simple_entry(
    ledger_number: &str,
    transaction_date: NaiveDate,
    debit_account: uuid::Uuid,
    credit_account: uuid::Uuid,
    amount: Decimal,
) -> LedgerEntryInput {
    LedgerEntryInput {
        ledger_number: ledger_number.to_string(),
        transaction_date,
        period_id: None,
        reference_number: None,
        description: format!("Entry {ledger_number}"),
        lines: vec![
            LedgerLineInput::debit(debit_account, amount),
            LedgerLineInput::credit(credit_account, amount),
        ],
    }
}
