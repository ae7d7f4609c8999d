//! Opening-balance input types and validation.

use std::collections::HashSet;

use chrono::NaiveDate;
use neraca_shared::types::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{EntryTotals, LedgerError};

/// One account's opening amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalanceDetailInput {
    /// The account seeded.
    pub account_id: Uuid,
    /// Opening debit (zero on credit details).
    pub debit: Decimal,
    /// Opening credit (zero on debit details).
    pub credit: Decimal,
}

impl OpeningBalanceDetailInput {
    /// Creates a debit detail.
    #[must_use]
    pub fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// Creates a credit detail.
    #[must_use]
    pub fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// Input for creating or replacing an opening balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningBalanceInput {
    /// Date the balances are stated at.
    pub as_of_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Per-account amounts.
    pub details: Vec<OpeningBalanceDetailInput>,
}

/// Validates opening-balance details and returns them rounded with totals.
///
/// The totals are not required to balance; callers decide how to report an
/// unbalanced opening balance.
///
/// # Errors
///
/// - `EmptyOpeningBalance` if there are no details
/// - `NegativeAmount`, `ZeroAmount`, `BothSides` per detail (1-based)
/// - `DuplicateOpeningAccount` if an account appears twice
pub fn validate_details(
    details: &[OpeningBalanceDetailInput],
) -> Result<(Vec<OpeningBalanceDetailInput>, EntryTotals), LedgerError> {
    if details.is_empty() {
        return Err(LedgerError::EmptyOpeningBalance);
    }

    let mut seen = HashSet::with_capacity(details.len());
    let mut totals = EntryTotals::default();
    let mut validated = Vec::with_capacity(details.len());

    for (index, detail) in details.iter().enumerate() {
        let line = index + 1;
        let debit = round_money(detail.debit);
        let credit = round_money(detail.credit);

        if debit < Decimal::ZERO || credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line });
        }
        match (debit.is_zero(), credit.is_zero()) {
            (true, true) => return Err(LedgerError::ZeroAmount { line }),
            (false, false) => return Err(LedgerError::BothSides { line }),
            _ => {}
        }
        if !seen.insert(detail.account_id) {
            return Err(LedgerError::DuplicateOpeningAccount(detail.account_id));
        }

        totals.add(debit, credit);
        validated.push(OpeningBalanceDetailInput {
            account_id: detail.account_id,
            debit,
            credit,
        });
    }

    Ok((validated, totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_single_debit_detail_is_valid() {
        let cash = Uuid::new_v4();
        let (details, totals) =
            validate_details(&[OpeningBalanceDetailInput::debit(cash, dec!(2000000))]).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(totals.debit, dec!(2000000));
        assert!(!totals.is_balanced());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            validate_details(&[]),
            Err(LedgerError::EmptyOpeningBalance)
        ));
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let cash = Uuid::new_v4();
        let result = validate_details(&[
            OpeningBalanceDetailInput::debit(cash, dec!(10)),
            OpeningBalanceDetailInput::credit(cash, dec!(10)),
        ]);
        assert!(matches!(result, Err(LedgerError::DuplicateOpeningAccount(id)) if id == cash));
    }

    #[test]
    fn test_invalid_sides_rejected() {
        let both = OpeningBalanceDetailInput {
            account_id: Uuid::new_v4(),
            debit: dec!(1),
            credit: dec!(1),
        };
        assert!(matches!(
            validate_details(&[both]),
            Err(LedgerError::BothSides { line: 1 })
        ));

        let negative = OpeningBalanceDetailInput::credit(Uuid::new_v4(), dec!(-5));
        assert!(matches!(
            validate_details(&[OpeningBalanceDetailInput::debit(Uuid::new_v4(), dec!(5)), negative]),
            Err(LedgerError::NegativeAmount { line: 2 })
        ));

        assert!(matches!(
            validate_details(&[OpeningBalanceDetailInput::debit(Uuid::new_v4(), dec!(0))]),
            Err(LedgerError::ZeroAmount { line: 1 })
        ));
    }
}
