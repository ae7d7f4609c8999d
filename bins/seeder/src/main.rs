//! Database seeder for Neraca development and testing.
//!
//! Seeds a default chart of accounts and the monthly periods of the current
//! fiscal year. Running it again skips whatever already exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use neraca_core::LedgerSettings;
use neraca_core::account::AccountType;
use neraca_db::repositories::{CreateAccountInput, DateRange};
use neraca_db::{Repositories, connect_with};
use neraca_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default chart of accounts: (code, name, type).
const CHART: &[(&str, &str, AccountType)] = &[
    ("1100", "Cash", AccountType::Asset),
    ("1200", "Accounts Receivable", AccountType::Asset),
    ("1300", "Inventory", AccountType::Asset),
    ("2100", "Accounts Payable", AccountType::Liability),
    ("3100", "Owner's Equity", AccountType::Equity),
    ("4100", "Sales", AccountType::Revenue),
    ("5100", "Cost of Goods Sold", AccountType::Expense),
    ("6100", "Operating Expenses", AccountType::Expense),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neraca=debug,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let settings = LedgerSettings::try_from(&config.ledger)?;

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let repos = Repositories::new(db, settings);

    seed_chart_of_accounts(&repos).await?;
    seed_current_fiscal_year(&repos, &settings).await?;

    info!("Seeding complete");
    Ok(())
}

/// Creates every account of [`CHART`] whose code is not taken yet.
async fn seed_chart_of_accounts(repos: &Repositories) -> anyhow::Result<()> {
    let mut created = 0;
    for &(code, name, account_type) in CHART {
        if repos.accounts.find_by_code(code).await?.is_some() {
            info!(code, "Account already exists, skipping");
            continue;
        }
        repos
            .accounts
            .create(CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                normal_balance: None,
            })
            .await
            .with_context(|| format!("failed to create account {code}"))?;
        created += 1;
    }
    info!(created, "Chart of accounts seeded");
    Ok(())
}

/// Generates the current fiscal year's months unless any period already
/// falls inside the year.
async fn seed_current_fiscal_year(
    repos: &Repositories,
    settings: &LedgerSettings,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let year = settings.calendar.fiscal_year_of(today);
    let (from, to) = settings
        .calendar
        .year_bounds(year)
        .with_context(|| format!("fiscal year {year} is out of range"))?;

    let existing = repos.periods.list(Some(DateRange { from, to })).await?;
    if !existing.is_empty() {
        info!(fiscal_year = year, periods = existing.len(), "Periods already exist, skipping");
        return Ok(());
    }

    let periods = repos.periods.generate_year(year).await?;
    info!(fiscal_year = year, periods = periods.len(), "Fiscal year periods seeded");
    Ok(())
}
