//! Operator CLI for the trial-balance aggregate.
//!
//! Usage:
//!   ledger-admin recalculate <PERIOD_ID>...   - Rebuild periods from posted data
//!   ledger-admin check <PERIOD_ID>            - Report rows that disagree with a rebuild
//!   ledger-admin trial-balance <PERIOD_ID>    - Dump the stored trial balance
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use neraca_core::LedgerSettings;
use neraca_core::account::AccountType;
use neraca_core::trial_balance::{AccountDrift, RecalculationOutcome};
use neraca_db::repositories::TrialBalanceFilter;
use neraca_db::{Repositories, connect_with};
use neraca_shared::AppConfig;
use neraca_shared::types::PeriodId;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ledger-admin")]
#[command(about = "Recalculate, check and dump trial balances")]
struct Cli {
    /// Database URL; overrides configuration.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the trial balance of each period from posted entries and
    /// posted opening balances.
    Recalculate {
        /// Periods to rebuild.
        #[arg(required = true)]
        period_ids: Vec<PeriodId>,
    },
    /// Compare stored rows against a rebuild without writing anything.
    Check {
        /// Period to check.
        period_id: PeriodId,
    },
    /// Print the stored trial balance of a period.
    TrialBalance {
        /// Period to read.
        period_id: PeriodId,
        /// Only accounts of this type.
        #[arg(long)]
        account_type: Option<AccountType>,
        /// Substring match on account code or name.
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecalculationReport {
    period_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<RecalculationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

#[derive(Serialize)]
struct ErrorReport {
    code: &'static str,
    message: String,
    retryable: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DriftReport {
    period_id: Uuid,
    consistent: bool,
    drift: Vec<AccountDrift>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neraca=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    let settings = LedgerSettings::try_from(&config.ledger)?;
    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    let repos = Repositories::new(db, settings);

    match cli.command {
        Command::Recalculate { period_ids } => recalculate(&repos, &period_ids).await,
        Command::Check { period_id } => check(&repos, period_id).await,
        Command::TrialBalance {
            period_id,
            account_type,
            search,
        } => {
            let filter = TrialBalanceFilter {
                account_type,
                search,
                page: None,
            };
            let report = repos.trial_balance.read(period_id.into_inner(), filter).await?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn recalculate(repos: &Repositories, period_ids: &[PeriodId]) -> anyhow::Result<ExitCode> {
    let ids: Vec<Uuid> = period_ids.iter().map(|id| id.into_inner()).collect();
    let results = repos.trial_balance.recalculate_many(&ids).await?;

    let mut failed = 0;
    let reports: Vec<RecalculationReport> = results
        .into_iter()
        .map(|r| match r.result {
            Ok(outcome) => RecalculationReport {
                period_id: r.period_id,
                outcome: Some(outcome),
                error: None,
            },
            Err(err) => {
                failed += 1;
                let retryable = err.is_retryable();
                let ledger = err.into_ledger();
                RecalculationReport {
                    period_id: r.period_id,
                    outcome: None,
                    error: Some(ErrorReport {
                        code: ledger.error_code(),
                        message: ledger.to_string(),
                        retryable,
                    }),
                }
            }
        })
        .collect();

    print_json(&reports)?;
    info!(periods = reports.len(), failed, "Recalculation finished");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn check(repos: &Repositories, period_id: PeriodId) -> anyhow::Result<ExitCode> {
    let drift = repos.trial_balance.detect_drift(period_id.into_inner()).await?;
    let consistent = drift.is_empty();
    if !consistent {
        warn!(period_id = %period_id, accounts = drift.len(), "Stored trial balance has drifted");
    }

    print_json(&DriftReport {
        period_id: period_id.into_inner(),
        consistent,
        drift,
    })?;
    Ok(if consistent {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
