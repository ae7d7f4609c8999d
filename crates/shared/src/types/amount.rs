//! Decimal helpers for monetary amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end and are stored with
//! four fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits persisted for every amount column.
pub const MONEY_SCALE: u32 = 4;

/// Rounds an amount to the persisted scale using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if `a` and `b` differ by strictly less than `tolerance`.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1.23455), dec!(1.2346))]
    #[case(dec!(1.23445), dec!(1.2344))]
    #[case(dec!(1000000), dec!(1000000))]
    #[case(dec!(0.00005), dec!(0.0000))]
    fn test_round_money(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[rstest]
    #[case(dec!(100.00), dec!(100.009), true)]
    #[case(dec!(100.00), dec!(100.01), false)]
    #[case(dec!(500), dec!(400), false)]
    #[case(dec!(-3.001), dec!(-3), true)]
    fn test_within_tolerance(#[case] a: Decimal, #[case] b: Decimal, #[case] expected: bool) {
        assert_eq!(within_tolerance(a, b, dec!(0.01)), expected);
    }
}
