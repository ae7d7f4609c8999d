//! Full rebuild of a period's trial balance from the ledger log.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::row::{Sides, TrialBalanceFigures};
use crate::account::NormalBalance;
use crate::ledger::AccountMovement;

/// In-memory rebuild of one period.
///
/// Feed it every posted movement and every posted opening-balance detail of
/// the period, then call [`PeriodRebuild::finish`]. Each input is counted
/// exactly once, so running the same inputs twice yields identical rows.
#[derive(Debug, Default)]
pub struct PeriodRebuild {
    rows: BTreeMap<Uuid, TrialBalanceFigures>,
}

impl PeriodRebuild {
    /// Creates an empty rebuild.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds posted movement for one account.
    pub fn apply_movement(&mut self, movement: &AccountMovement) {
        self.rows
            .entry(movement.account_id)
            .or_default()
            .add_movement(movement.debit, movement.credit);
    }

    /// Adds an opening-balance detail for one account.
    pub fn apply_opening(&mut self, account_id: Uuid, debit: Decimal, credit: Decimal) {
        self.rows
            .entry(account_id)
            .or_default()
            .add_opening(debit, credit);
    }

    /// Makes sure `account_id` gets a row even without movement this period,
    /// so a non-zero `ytd` carried from earlier periods is not lost.
    pub fn include(&mut self, account_id: Uuid) {
        self.rows.entry(account_id).or_default();
    }

    /// Accounts present in the rebuild, ascending.
    pub fn account_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.rows.keys().copied()
    }

    /// Finalises every row: recomputes `ending` and sets `ytd` from the
    /// movement of earlier periods in the same fiscal year.
    ///
    /// `prior_movement` returns the summed period columns of the account over
    /// the fiscal-year periods that start before this one. Accounts missing
    /// from `normal_balance` and rows that finish all zero are dropped.
    pub fn finish<N, P>(self, normal_balance: N, prior_movement: P) -> Vec<(Uuid, TrialBalanceFigures)>
    where
        N: Fn(Uuid) -> Option<NormalBalance>,
        P: Fn(Uuid) -> Sides,
    {
        self.rows
            .into_iter()
            .filter_map(|(account_id, mut figures)| {
                let direction = normal_balance(account_id)?;
                figures.recompute_ending(direction);
                figures.set_ytd(direction, prior_movement(account_id).plus(figures.period));
                (!figures.is_zero()).then_some((account_id, figures))
            })
            .collect()
    }
}

/// Result of rebuilding one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationOutcome {
    /// The rebuilt period.
    pub period_id: Uuid,
    /// Rows written.
    pub rows_rebuilt: usize,
    /// Posted entries scanned.
    pub entries_scanned: usize,
    /// Posted opening balances applied.
    pub opening_balances_applied: usize,
}

/// One account whose stored row disagrees with a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDrift {
    /// The account.
    pub account_id: Uuid,
    /// What is stored (`None` if the row is missing).
    pub stored: Option<TrialBalanceFigures>,
    /// What a rebuild produces (`None` if the row should not exist).
    pub expected: Option<TrialBalanceFigures>,
}

/// Compares stored rows with rebuilt rows.
///
/// Missing rows compare equal to all-zero rows, so a stored zero row without
/// a rebuilt counterpart is not drift.
#[must_use]
pub fn detect_drift(
    stored: &BTreeMap<Uuid, TrialBalanceFigures>,
    expected: &BTreeMap<Uuid, TrialBalanceFigures>,
    tolerance: Decimal,
) -> Vec<AccountDrift> {
    let zero = TrialBalanceFigures::default();
    let mut accounts: Vec<Uuid> = stored.keys().chain(expected.keys()).copied().collect();
    accounts.sort_unstable();
    accounts.dedup();

    accounts
        .into_iter()
        .filter_map(|account_id| {
            let have = stored.get(&account_id).copied();
            let want = expected.get(&account_id).copied();
            let matches = have
                .unwrap_or(zero)
                .approx_eq(&want.unwrap_or(zero), tolerance);
            (!matches).then_some(AccountDrift {
                account_id,
                stored: have,
                expected: want,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(account_id: Uuid, debit: Decimal, credit: Decimal) -> AccountMovement {
        AccountMovement {
            account_id,
            debit,
            credit,
        }
    }

    #[test]
    fn test_rebuild_scenario_rows() {
        let cash = Uuid::from_u128(1100);
        let payable = Uuid::from_u128(2100);
        let mut rebuild = PeriodRebuild::new();
        rebuild.apply_movement(&movement(cash, dec!(1000000), dec!(0)));
        rebuild.apply_movement(&movement(payable, dec!(0), dec!(1000000)));

        let rows = rebuild.finish(
            |id| Some(if id == cash { NormalBalance::Debit } else { NormalBalance::Credit }),
            |_| Sides::ZERO,
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, cash);
        assert_eq!(rows[0].1.ending.debit, dec!(1000000));
        assert_eq!(rows[1].1.ending.credit, dec!(1000000));
        assert_eq!(rows[1].1.ytd.credit, dec!(1000000));
    }

    #[test]
    fn test_rebuild_includes_opening_and_prior_ytd() {
        let cash = Uuid::from_u128(1);
        let mut rebuild = PeriodRebuild::new();
        rebuild.apply_opening(cash, dec!(2000000), dec!(0));
        rebuild.apply_movement(&movement(cash, dec!(0), dec!(300)));

        let rows = rebuild.finish(
            |_| Some(NormalBalance::Debit),
            |_| Sides::new(dec!(1000), dec!(0)),
        );
        let figures = rows[0].1;
        assert_eq!(figures.opening.debit, dec!(2000000));
        assert_eq!(figures.ending, Sides::new(dec!(1999700), dec!(0)));
        assert_eq!(figures.ytd, Sides::new(dec!(700), dec!(0)));
    }

    #[test]
    fn test_rebuild_drops_unknown_accounts() {
        let mut rebuild = PeriodRebuild::new();
        rebuild.apply_movement(&movement(Uuid::new_v4(), dec!(1), dec!(0)));
        assert!(rebuild.finish(|_| None, |_| Sides::ZERO).is_empty());
    }

    #[test]
    fn test_included_account_keeps_prior_ytd() {
        let receivable = Uuid::from_u128(1200);
        let idle = Uuid::from_u128(1300);
        let mut rebuild = PeriodRebuild::new();
        rebuild.include(receivable);
        rebuild.include(idle);

        let rows = rebuild.finish(
            |_| Some(NormalBalance::Debit),
            |id| if id == receivable { Sides::new(dec!(100), dec!(0)) } else { Sides::ZERO },
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, receivable);
        assert_eq!(rows[0].1.period, Sides::ZERO);
        assert_eq!(rows[0].1.ytd, Sides::new(dec!(100), dec!(0)));
    }

    #[test]
    fn test_detect_drift() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);

        let mut good = TrialBalanceFigures::default();
        good.add_movement(dec!(10), dec!(0));
        good.recompute_ending(NormalBalance::Debit);

        let mut stale = good;
        stale.ending = Sides::ZERO;

        let stored = BTreeMap::from([(a, good), (b, stale), (c, TrialBalanceFigures::default())]);
        let expected = BTreeMap::from([(a, good), (b, good)]);

        let drift = detect_drift(&stored, &expected, dec!(0.01));
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].account_id, b);
        assert_eq!(drift[0].stored, Some(stale));
    }

    #[test]
    fn test_detect_missing_row() {
        let a = Uuid::from_u128(1);
        let mut good = TrialBalanceFigures::default();
        good.add_movement(dec!(10), dec!(0));
        let expected = BTreeMap::from([(a, good)]);

        let drift = detect_drift(&BTreeMap::new(), &expected, dec!(0.01));
        assert_eq!(drift.len(), 1);
        assert!(drift[0].stored.is_none());
    }
}
