//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and written with the
//! schema builder so they run on PostgreSQL and SQLite alike.

pub use sea_orm_migration::prelude::*;

use sea_orm_migration::sea_orm::DbBackend;

mod m20250101_000001_registries;
mod m20250101_000002_ledger;
mod m20250101_000003_opening_balances;
mod m20250101_000004_trial_balance;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_registries::Migration),
            Box::new(m20250101_000002_ledger::Migration),
            Box::new(m20250101_000003_opening_balances::Migration),
            Box::new(m20250101_000004_trial_balance::Migration),
        ]
    }
}

/// Money column defaulting to zero: `NUMERIC(19,4)` on PostgreSQL, `REAL`
/// on SQLite.
fn money<T: IntoIden>(manager: &SchemaManager, name: T) -> ColumnDef {
    let mut column = ColumnDef::new(name);
    match manager.get_database_backend() {
        DbBackend::Sqlite => column.custom(Alias::new("REAL")),
        _ => column.decimal_len(19, 4),
    };
    column.not_null().default(0);
    column
}

/// Timestamp column defaulting to now.
fn created_at<T: IntoIden>(name: T) -> ColumnDef {
    let mut column = ColumnDef::new(name);
    column
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp());
    column
}
