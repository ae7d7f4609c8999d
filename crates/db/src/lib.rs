//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations (PostgreSQL and SQLite)
//! - Repositories for the account and period registries, the ledger store,
//!   the balance aggregator and the opening-balance lifecycle
//! - The per-period lock registry shared by those repositories

pub mod entities;
pub mod error;
pub mod locks;
pub mod migration;
pub mod repositories;

pub use error::RepositoryError;
pub use locks::PeriodLocks;
pub use repositories::{
    AccountRepository, LedgerRepository, OpeningBalanceRepository, PeriodRepository, Repositories,
    TrialBalanceRepository,
};

use std::time::Duration;

use neraca_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database with default pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_with(&DatabaseConfig::with_url(database_url)).await
}

/// Establishes a connection pool from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}
