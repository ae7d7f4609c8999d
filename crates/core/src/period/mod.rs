//! Accounting periods and posting rules.
//!
//! Periods are non-overlapping date ranges, each open or closed. A posting
//! lands only in an open period whose range contains its date.

pub mod calendar;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

pub use calendar::{FiscalCalendar, PeriodSpec};

/// An accounting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name (e.g. "January 2025").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Closed periods reject every posting.
    pub is_closed: bool,
}

impl Period {
    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Checks that an entry dated `date` may be posted into this period.
    ///
    /// # Errors
    ///
    /// - `PeriodClosed` if the period is closed
    /// - `DateOutsidePeriod` if `date` is outside the period's range
    pub fn ensure_accepts(&self, date: NaiveDate) -> Result<(), LedgerError> {
        if self.is_closed {
            return Err(LedgerError::PeriodClosed(self.id));
        }
        if !self.contains_date(date) {
            return Err(LedgerError::DateOutsidePeriod {
                date,
                period_id: self.id,
            });
        }
        Ok(())
    }
}

/// Validates that `start_date` is not after `end_date`.
///
/// # Errors
///
/// Returns `LedgerError::InvalidDateRange` otherwise.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), LedgerError> {
    if start_date > end_date {
        return Err(LedgerError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}

/// Checks if two inclusive date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Validates a new period range against the existing periods.
///
/// # Errors
///
/// - `InvalidDateRange` if the range is inverted
/// - `OverlappingPeriod` naming the first existing period it overlaps
pub fn validate_new_period(
    start_date: NaiveDate,
    end_date: NaiveDate,
    existing: &[Period],
) -> Result<(), LedgerError> {
    validate_date_range(start_date, end_date)?;

    if let Some(clash) = existing
        .iter()
        .find(|p| date_ranges_overlap(start_date, end_date, p.start_date, p.end_date))
    {
        return Err(LedgerError::OverlappingPeriod(clash.name.clone()));
    }
    Ok(())
}

/// Locates the open period that receives a posting dated `date`.
///
/// Used for opening balances, which carry a date but no period.
///
/// # Errors
///
/// - `NoOpenPeriod` if no period contains the date
/// - `PeriodClosed` if the containing period is closed
pub fn resolve_open_period(date: NaiveDate, periods: &[Period]) -> Result<&Period, LedgerError> {
    let period = periods
        .iter()
        .find(|p| p.contains_date(date))
        .ok_or(LedgerError::NoOpenPeriod(date))?;

    if period.is_closed {
        return Err(LedgerError::PeriodClosed(period.id));
    }
    Ok(period)
}
