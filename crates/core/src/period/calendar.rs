//! Fiscal calendar: which periods belong to the same fiscal year.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Fiscal calendar anchored on a start month.
///
/// A fiscal year is labelled by the calendar year in which it starts, so with
/// `start_month = 4` the fiscal year 2025 runs 2025-04-01..=2026-03-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self { start_month: 1 }
    }
}

/// Name and bounds of a period to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSpec {
    /// Display name (e.g. "January 2026").
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

impl FiscalCalendar {
    /// Creates a calendar whose fiscal year starts on the given month.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidFiscalMonth` unless `1 <= start_month <= 12`.
    pub fn new(start_month: u32) -> Result<Self, LedgerError> {
        if (1..=12).contains(&start_month) {
            Ok(Self { start_month })
        } else {
            Err(LedgerError::InvalidFiscalMonth(start_month))
        }
    }

    /// Month on which the fiscal year starts.
    #[must_use]
    pub const fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Fiscal year label containing `date`.
    #[must_use]
    pub fn fiscal_year_of(&self, date: NaiveDate) -> i32 {
        if date.month() >= self.start_month {
            date.year()
        } else {
            date.year() - 1
        }
    }

    /// First and last day of fiscal year `year`.
    #[must_use]
    pub fn year_bounds(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(year, self.start_month, 1)?;
        let end = start.checked_add_months(Months::new(12))?.pred_opt()?;
        Some((start, end))
    }

    /// Bounds of the fiscal year containing `date`.
    #[must_use]
    pub fn year_bounds_for(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        self.year_bounds(self.fiscal_year_of(date))
    }

    /// Generates the twelve monthly periods of fiscal year `year`.
    #[must_use]
    pub fn monthly_periods(&self, year: i32) -> Vec<PeriodSpec> {
        let Some((year_start, _)) = self.year_bounds(year) else {
            return Vec::new();
        };

        (0..12)
            .filter_map(|offset| {
                let start_date = year_start.checked_add_months(Months::new(offset))?;
                let end_date = start_date.checked_add_months(Months::new(1))?.pred_opt()?;
                Some(PeriodSpec {
                    name: format!("{} {}", month_name(start_date.month()), start_date.year()),
                    start_date,
                    end_date,
                })
            })
            .collect()
    }
}

/// Returns month name.
fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
