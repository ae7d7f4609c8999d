//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every repository that writes trial-balance rows shares one [`PeriodLocks`]
//! registry, so construct them from the same clone.
//!
//! [`PeriodLocks`]: crate::PeriodLocks

pub mod account;
pub mod ledger;
pub mod opening_balance;
pub mod period;
pub mod trial_balance;

pub use account::{AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use ledger::{LedgerEntryRecord, LedgerQuery, LedgerQueryResult, LedgerRepository};
pub use opening_balance::{OpeningBalanceRecord, OpeningBalanceRepository};
pub use period::{CreatePeriodInput, DateRange, PeriodRepository};
pub use trial_balance::{
    PeriodRecalculation, TrialBalanceFilter, TrialBalanceLine, TrialBalanceReport,
    TrialBalanceRepository,
};

use neraca_core::LedgerSettings;
use sea_orm::DatabaseConnection;

use crate::locks::PeriodLocks;

/// Every repository built over one connection pool and one lock registry.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Chart of accounts.
    pub accounts: AccountRepository,
    /// Accounting periods.
    pub periods: PeriodRepository,
    /// Ledger entries.
    pub ledger: LedgerRepository,
    /// Trial balance reads and rebuilds.
    pub trial_balance: TrialBalanceRepository,
    /// Opening balances.
    pub opening_balances: OpeningBalanceRepository,
}

impl Repositories {
    /// Builds every repository with a fresh lock registry.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        let locks = PeriodLocks::new();
        Self {
            accounts: AccountRepository::new(db.clone()),
            periods: PeriodRepository::new(db.clone(), locks.clone(), settings),
            ledger: LedgerRepository::new(db.clone(), locks.clone(), settings),
            trial_balance: TrialBalanceRepository::new(db.clone(), locks.clone(), settings),
            opening_balances: OpeningBalanceRepository::new(db, locks, settings),
        }
    }
}
