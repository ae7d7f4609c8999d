//! Trial balance: one aggregate row per (period, account).
//!
//! Incremental maintenance and full rebuild share the arithmetic in
//! [`row`], which is what makes them produce identical figures.

pub mod builder;
pub mod row;
pub mod totals;

#[cfg(test)]
mod props;

pub use builder::{AccountDrift, PeriodRebuild, RecalculationOutcome, detect_drift};
pub use row::{Sides, TrialBalanceFigures, ytd_chain};
pub use totals::TrialBalanceTotals;
