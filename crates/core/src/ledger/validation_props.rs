//! Property-based tests for ledger line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::LedgerLineInput;
use super::validation::{aggregate_movements, validate_lines};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy for a balanced set of lines: several debits against one credit.
fn balanced_lines() -> impl Strategy<Value = Vec<LedgerLineInput>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|amounts| {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<LedgerLineInput> = amounts
            .into_iter()
            .map(|amount| LedgerLineInput::debit(Uuid::new_v4(), amount))
            .collect();
        lines.push(LedgerLineInput::credit(Uuid::new_v4(), total));
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Zero amount lines are rejected.
    #[test]
    fn prop_zero_amount_rejected(other_amount in positive_amount()) {
        let lines = vec![
            LedgerLineInput::debit(Uuid::new_v4(), Decimal::ZERO),
            LedgerLineInput::credit(Uuid::new_v4(), other_amount),
        ];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::ZeroAmount { line: 1 })),
            "Zero amount should be rejected, got: {:?}",
            result
        );
    }

    /// Negative amount lines are rejected.
    #[test]
    fn prop_negative_amount_rejected(
        neg_amount in negative_amount(),
        other_amount in positive_amount(),
    ) {
        let lines = vec![
            LedgerLineInput::debit(Uuid::new_v4(), other_amount),
            LedgerLineInput::credit(Uuid::new_v4(), neg_amount),
        ];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NegativeAmount { line: 2 })),
            "Negative amount should be rejected, got: {:?}",
            result
        );
    }

    /// Single line entries are rejected.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount()) {
        let lines = vec![LedgerLineInput::debit(Uuid::new_v4(), amount)];
        prop_assert!(matches!(validate_lines(&lines), Err(LedgerError::InsufficientLines)));
    }

    /// Any mismatch between debit and credit totals is rejected with both totals.
    #[test]
    fn prop_unbalanced_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!(debit != credit);
        let lines = vec![
            LedgerLineInput::debit(Uuid::new_v4(), debit),
            LedgerLineInput::credit(Uuid::new_v4(), credit),
        ];

        match validate_lines(&lines) {
            Err(LedgerError::Unbalanced { debit: d, credit: c }) => {
                prop_assert_eq!(d, debit);
                prop_assert_eq!(c, credit);
            }
            other => prop_assert!(false, "expected Unbalanced, got {:?}", other),
        }
    }

    /// Balanced entries are accepted and their totals match.
    #[test]
    fn prop_balanced_accepted(lines in balanced_lines()) {
        let (validated, totals) = validate_lines(&lines).unwrap();
        prop_assert_eq!(validated.len(), lines.len());
        prop_assert!(totals.is_balanced());
    }

    /// Aggregated movements preserve both column totals.
    #[test]
    fn prop_aggregation_preserves_totals(lines in balanced_lines()) {
        let (validated, totals) = validate_lines(&lines).unwrap();
        let movements = aggregate_movements(&validated);

        let debit: Decimal = movements.iter().map(|m| m.debit).sum();
        let credit: Decimal = movements.iter().map(|m| m.credit).sum();
        prop_assert_eq!(debit, totals.debit);
        prop_assert_eq!(credit, totals.credit);

        for pair in movements.windows(2) {
            prop_assert!(pair[0].account_id < pair[1].account_id);
        }
    }
}
