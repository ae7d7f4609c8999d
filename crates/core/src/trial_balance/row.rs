//! Trial-balance row arithmetic.
//!
//! A row holds four debit/credit pairs for one (period, account):
//! opening, period movement, ending and year-to-date. `ending` and `ytd` are
//! derived columns and are always recomputed with the single net-then-split
//! formula after any change to `opening` or `period`.

use neraca_shared::types::within_tolerance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::NormalBalance;

/// A debit/credit column pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

impl Sides {
    /// Zero on both sides.
    pub const ZERO: Self = Self {
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
    };

    /// Creates a pair.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Signed net in the given direction.
    #[must_use]
    pub fn net(self, normal_balance: NormalBalance) -> Decimal {
        normal_balance.net(self.debit, self.credit)
    }

    /// Splits a signed net into a pair with at most one non-zero side.
    #[must_use]
    pub fn from_net(normal_balance: NormalBalance, net: Decimal) -> Self {
        let (debit, credit) = normal_balance.split(net);
        Self { debit, credit }
    }

    /// Component-wise sum.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            debit: self.debit + other.debit,
            credit: self.credit + other.credit,
        }
    }

    /// Returns true if both sides are within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: Decimal) -> bool {
        within_tolerance(self.debit, other.debit, tolerance)
            && within_tolerance(self.credit, other.credit, tolerance)
    }
}

/// The stored figures of one trial-balance row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceFigures {
    /// Opening balance seeded by opening-balance postings.
    pub opening: Sides,
    /// Movement posted in this period.
    pub period: Sides,
    /// `opening + period`, net-then-split.
    pub ending: Sides,
    /// Cumulative period movement since the start of the fiscal year.
    pub ytd: Sides,
}

impl TrialBalanceFigures {
    /// Adds posted movement. Negative amounts reverse a previous movement.
    pub fn add_movement(&mut self, debit: Decimal, credit: Decimal) {
        self.period = self.period.plus(Sides::new(debit, credit));
    }

    /// Adds an opening-balance detail.
    pub fn add_opening(&mut self, debit: Decimal, credit: Decimal) {
        self.opening = self.opening.plus(Sides::new(debit, credit));
    }

    /// Recomputes `ending` from `opening + period`.
    ///
    /// `net = (openingDebit + periodDebit) - (openingCredit + periodCredit)`
    /// taken in the account's direction, then split so that only one side is
    /// non-zero.
    pub fn recompute_ending(&mut self, normal_balance: NormalBalance) {
        let combined = self.opening.plus(self.period);
        self.ending = Sides::from_net(normal_balance, combined.net(normal_balance));
    }

    /// Sets `ytd` from cumulative movement totals.
    pub fn set_ytd(&mut self, normal_balance: NormalBalance, cumulative: Sides) {
        self.ytd = Sides::from_net(normal_balance, cumulative.net(normal_balance));
    }

    /// Checks `ending == opening + net(period)` in the account's direction.
    #[must_use]
    pub fn is_consistent(&self, normal_balance: NormalBalance) -> bool {
        self.ending.net(normal_balance)
            == self.opening.net(normal_balance) + self.period.net(normal_balance)
            && (self.ending.debit.is_zero() || self.ending.credit.is_zero())
    }

    /// Returns true if every column is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if every column is within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: Decimal) -> bool {
        self.opening.approx_eq(other.opening, tolerance)
            && self.period.approx_eq(other.period, tolerance)
            && self.ending.approx_eq(other.ending, tolerance)
            && self.ytd.approx_eq(other.ytd, tolerance)
    }
}

/// Recomputes YTD for consecutive periods of one fiscal year.
///
/// `movements` are the period columns of one account ordered by period start.
/// Element `i` of the result is the YTD pair for period `i`.
#[must_use]
pub fn ytd_chain(normal_balance: NormalBalance, movements: &[Sides]) -> Vec<Sides> {
    let mut cumulative = Sides::ZERO;
    movements
        .iter()
        .map(|movement| {
            cumulative = cumulative.plus(*movement);
            Sides::from_net(normal_balance, cumulative.net(normal_balance))
        })
        .collect()
}
