//! Property-based tests for trial-balance maintenance.

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::builder::PeriodRebuild;
use super::row::{Sides, TrialBalanceFigures, ytd_chain};
use crate::account::NormalBalance;
use crate::ledger::{AccountMovement, LedgerLineInput, aggregate_movements, validate_lines};

const ACCOUNTS: u128 = 5;

fn direction(account_id: Uuid) -> NormalBalance {
    if account_id.as_u128() % 2 == 0 {
        NormalBalance::Debit
    } else {
        NormalBalance::Credit
    }
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// One balanced entry: a debit and a credit of the same amount on two accounts.
fn entry() -> impl Strategy<Value = Vec<LedgerLineInput>> {
    (0..ACCOUNTS, 0..ACCOUNTS, amount()).prop_map(|(debit_account, credit_account, amount)| {
        vec![
            LedgerLineInput::debit(Uuid::from_u128(debit_account), amount),
            LedgerLineInput::credit(Uuid::from_u128(credit_account), amount),
        ]
    })
}

fn opening() -> impl Strategy<Value = Vec<(Uuid, Decimal, Decimal)>> {
    prop::collection::vec(
        (0..ACCOUNTS, amount(), any::<bool>()).prop_map(|(account, amount, is_debit)| {
            let (debit, credit) = if is_debit {
                (amount, Decimal::ZERO)
            } else {
                (Decimal::ZERO, amount)
            };
            (Uuid::from_u128(account), debit, credit)
        }),
        0..4,
    )
}

/// Replays entries one at a time the way postings do.
fn incremental(
    entries: &[Vec<AccountMovement>],
    openings: &[(Uuid, Decimal, Decimal)],
) -> BTreeMap<Uuid, TrialBalanceFigures> {
    let mut rows: BTreeMap<Uuid, TrialBalanceFigures> = BTreeMap::new();
    for (account_id, debit, credit) in openings {
        let row = rows.entry(*account_id).or_default();
        row.add_opening(*debit, *credit);
        row.recompute_ending(direction(*account_id));
        let period = row.period;
        row.set_ytd(direction(*account_id), period);
    }
    for movements in entries {
        for movement in movements {
            let row = rows.entry(movement.account_id).or_default();
            row.add_movement(movement.debit, movement.credit);
            row.recompute_ending(direction(movement.account_id));
            let period = row.period;
            row.set_ytd(direction(movement.account_id), period);
        }
    }
    rows
}

fn rebuilt(
    entries: &[Vec<AccountMovement>],
    openings: &[(Uuid, Decimal, Decimal)],
) -> BTreeMap<Uuid, TrialBalanceFigures> {
    let mut rebuild = PeriodRebuild::new();
    for (account_id, debit, credit) in openings {
        rebuild.apply_opening(*account_id, *debit, *credit);
    }
    for movement in entries.iter().flatten() {
        rebuild.apply_movement(movement);
    }
    rebuild
        .finish(|id| Some(direction(id)), |_| Sides::ZERO)
        .into_iter()
        .collect()
}

fn movements_of(entries: &[Vec<LedgerLineInput>]) -> Vec<Vec<AccountMovement>> {
    entries
        .iter()
        .map(|lines| {
            let (validated, _) = validate_lines(lines).unwrap();
            aggregate_movements(&validated)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Rebuilding from the log matches incremental maintenance.
    #[test]
    fn prop_rebuild_matches_incremental(
        entries in prop::collection::vec(entry(), 0..20),
        openings in opening(),
    ) {
        let movements = movements_of(&entries);
        let live = incremental(&movements, &openings);
        let fresh = rebuilt(&movements, &openings);

        prop_assert_eq!(live.len(), fresh.len());
        for (account_id, row) in &live {
            let other = fresh.get(account_id).unwrap();
            prop_assert!(row.approx_eq(other, dec!(0.01)), "{:?} vs {:?}", row, other);
        }
    }

    /// Rebuilding twice from the same log gives the same rows.
    #[test]
    fn prop_rebuild_idempotent(
        entries in prop::collection::vec(entry(), 0..20),
        openings in opening(),
    ) {
        let movements = movements_of(&entries);
        prop_assert_eq!(rebuilt(&movements, &openings), rebuilt(&movements, &openings));
    }

    /// Every maintained row satisfies ending == opening + net(period).
    #[test]
    fn prop_rows_consistent(
        entries in prop::collection::vec(entry(), 0..20),
        openings in opening(),
    ) {
        let movements = movements_of(&entries);
        for (account_id, row) in incremental(&movements, &openings) {
            prop_assert!(row.is_consistent(direction(account_id)));
        }
    }

    /// Balanced entries keep the period columns balanced across accounts.
    #[test]
    fn prop_period_columns_balance(entries in prop::collection::vec(entry(), 0..20)) {
        let movements = movements_of(&entries);
        let rows = incremental(&movements, &[]);
        let debit: Decimal = rows.values().map(|r| r.period.debit).sum();
        let credit: Decimal = rows.values().map(|r| r.period.credit).sum();
        prop_assert_eq!(debit, credit);
    }

    /// Applying an entry and then its reversal leaves every row at zero.
    #[test]
    fn prop_reversal_cancels(entries in prop::collection::vec(entry(), 1..10)) {
        let movements = movements_of(&entries);
        let reversed: Vec<Vec<AccountMovement>> = movements
            .iter()
            .map(|m| m.iter().map(|x| x.reversed()).collect())
            .collect();
        let all: Vec<Vec<AccountMovement>> = movements.into_iter().chain(reversed).collect();
        for row in incremental(&all, &[]).values() {
            prop_assert_eq!(row.ending, Sides::ZERO);
            prop_assert_eq!(row.period, Sides::ZERO);
        }
    }

    /// The last YTD of a chain equals the net of all movement.
    #[test]
    fn prop_ytd_chain_last_is_total(
        movements in prop::collection::vec((amount(), amount()), 1..12),
        debit_normal in any::<bool>(),
    ) {
        let normal = if debit_normal { NormalBalance::Debit } else { NormalBalance::Credit };
        let sides: Vec<Sides> = movements.iter().map(|(d, c)| Sides::new(*d, *c)).collect();
        let chain = ytd_chain(normal, &sides);
        let total = sides.iter().fold(Sides::ZERO, |acc, s| acc.plus(*s));
        prop_assert_eq!(chain.len(), sides.len());
        prop_assert_eq!(chain.last().unwrap().net(normal), total.net(normal));
    }
}

#[test]
fn test_scenario_post_cash_against_payable() {
    let cash = Uuid::from_u128(1100);
    let payable = Uuid::from_u128(2101);
    let lines = vec![
        LedgerLineInput::debit(cash, dec!(1000000)),
        LedgerLineInput::credit(payable, dec!(1000000)),
    ];
    let rows = incremental(&movements_of(&[lines]), &[]);
    let directions: HashMap<Uuid, NormalBalance> =
        [(cash, NormalBalance::Debit), (payable, NormalBalance::Credit)].into();

    assert_eq!(direction(cash), directions[&cash]);
    assert_eq!(direction(payable), directions[&payable]);
    assert_eq!(rows[&cash].ending.debit, dec!(1000000));
    assert_eq!(rows[&payable].ending.credit, dec!(1000000));
}
