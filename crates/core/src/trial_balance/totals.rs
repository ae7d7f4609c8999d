//! Column totals of a trial-balance read.

use neraca_shared::types::within_tolerance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::row::{Sides, TrialBalanceFigures};

/// Σ of every column over the returned rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceTotals {
    /// Σ opening.
    pub opening: Sides,
    /// Σ period movement.
    pub period: Sides,
    /// Σ ending.
    pub ending: Sides,
    /// Σ ytd.
    pub ytd: Sides,
    /// |Σ ending debit − Σ ending credit| below the tolerance.
    pub is_balanced: bool,
}

impl TrialBalanceTotals {
    /// Sums the rows.
    #[must_use]
    pub fn from_rows<'a, I>(rows: I, tolerance: Decimal) -> Self
    where
        I: IntoIterator<Item = &'a TrialBalanceFigures>,
    {
        let mut totals = rows.into_iter().fold(Self::default(), |acc, row| Self {
            opening: acc.opening.plus(row.opening),
            period: acc.period.plus(row.period),
            ending: acc.ending.plus(row.ending),
            ytd: acc.ytd.plus(row.ytd),
            is_balanced: false,
        });
        totals.is_balanced = within_tolerance(totals.ending.debit, totals.ending.credit, tolerance);
        totals
    }
}
