//! Core ledger logic for Neraca.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance arithmetic live here; the
//! `neraca-db` crate drives them inside store transactions.
//!
//! # Modules
//!
//! - `account` - Chart of accounts and normal-balance direction
//! - `period` - Accounting periods and the fiscal calendar
//! - `ledger` - Entry validation, errors, and query aggregates
//! - `trial_balance` - Per-period, per-account aggregate arithmetic
//! - `opening_balance` - Opening-balance lifecycle and validation

pub mod account;
pub mod ledger;
pub mod opening_balance;
pub mod period;
pub mod settings;
pub mod trial_balance;

pub use ledger::{ErrorKind, LedgerError};
pub use settings::LedgerSettings;
