//! Double-entry ledger logic.
//!
//! This module implements the pure half of the Ledger Store:
//! - Domain types for entry creation
//! - Line and balance validation
//! - Entry preparation against a period and the chart of accounts
//! - Full-set query aggregates
//! - Error types for every ledger operation

pub mod error;
pub mod service;
pub mod summary;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::{ErrorKind, LedgerError};
pub use service::{AccountInfo, LedgerService, PreparedEntry};
pub use summary::LedgerSummary;
pub use types::{
    AccountMovement, Dimensions, EntryStatus, EntryTotals, LedgerEntryInput, LedgerLineInput,
    ValidatedLine,
};
pub use validation::{aggregate_movements, validate_lines};
