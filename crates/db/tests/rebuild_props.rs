//! Property tests: incrementally maintained rows always equal a rebuild.

mod common;

use chrono::Days;
use common::{create_period, date, setup, simple_entry};
use neraca_db::repositories::{TrialBalanceFilter, TrialBalanceLine};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
struct Posting {
    day_offset: u64,
    debit_index: usize,
    credit_shift: usize,
    amount: u32,
    void: bool,
}

fn posting_strategy() -> impl Strategy<Value = Posting> {
    (0u64..59, 0usize..4, 1usize..4, 1u32..5000, prop::bool::weighted(0.2)).prop_map(
        |(day_offset, debit_index, credit_shift, amount, void)| Posting {
            day_offset,
            debit_index,
            credit_shift,
            amount,
            void,
        },
    )
}

async fn lines(t: &common::TestLedger, period_id: uuid::Uuid) -> Vec<TrialBalanceLine> {
    t.repos
        .trial_balance
        .read(period_id, TrialBalanceFilter::default())
        .await
        .unwrap()
        .lines
}

struct Observed {
    drift: usize,
    before: Vec<Vec<TrialBalanceLine>>,
    after: Vec<Vec<TrialBalanceLine>>,
}

async fn run(postings: Vec<Posting>) -> Observed {
    let t = setup().await;
    let feb = create_period(&t.repos, "February 2025", date(2025, 2, 1), date(2025, 2, 28)).await;
    let accounts = [t.cash.id, t.receivable.id, t.payable.id, t.sales.id];

    for (i, p) in postings.iter().enumerate() {
        let debit = accounts[p.debit_index];
        let credit = accounts[(p.debit_index + p.credit_shift) % accounts.len()];
        let transaction_date = date(2025, 1, 1) + Days::new(p.day_offset);
        let record = t
            .repos
            .ledger
            .record_entry(simple_entry(
                &format!("P-{i:03}"),
                transaction_date,
                debit,
                credit,
                Decimal::from(p.amount),
            ))
            .await
            .unwrap();
        if p.void {
            t.repos.ledger.void_entry(record.entry.id, "reversed").await.unwrap();
        }
    }

    let periods = [t.jan.id, feb.id];
    let mut drift = 0;
    let mut before = Vec::new();
    for id in periods {
        drift += t.repos.trial_balance.detect_drift(id).await.unwrap().len();
        before.push(lines(&t, id).await);
    }

    for outcome in t.repos.trial_balance.recalculate_many(&periods).await.unwrap() {
        outcome.result.unwrap();
    }

    let mut after = Vec::new();
    for id in periods {
        after.push(lines(&t, id).await);
    }

    Observed { drift, before, after }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Any sequence of postings and voids leaves rows a rebuild reproduces.
    #[test]
    fn prop_incremental_rows_match_rebuild(postings in prop::collection::vec(posting_strategy(), 1..10)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let observed = runtime.block_on(run(postings));

        prop_assert_eq!(observed.drift, 0);
        prop_assert!(observed.before.iter().flatten().all(|line| !line.figures.is_zero()));
        prop_assert_eq!(observed.before, observed.after);
    }
}
