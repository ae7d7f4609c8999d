//! Business rule validation for ledger lines.

use std::collections::BTreeMap;

use neraca_shared::types::round_money;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountMovement, EntryTotals, LedgerLineInput, ValidatedLine};

/// Validates the lines of an entry and returns them numbered and rounded,
/// together with their totals.
///
/// Rules, checked in order:
/// 1. At least 2 lines
/// 2. Per line: no negative amount, exactly one positive side
/// 3. Σdebit == Σcredit (exact, after rounding)
///
/// # Errors
///
/// Returns the first rule violation found.
pub fn validate_lines(
    lines: &[LedgerLineInput],
) -> Result<(Vec<ValidatedLine>, EntryTotals), LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut validated = Vec::with_capacity(lines.len());
    let mut totals = EntryTotals::default();

    for (index, line) in lines.iter().enumerate() {
        let position = index + 1;
        let debit = round_money(line.debit_amount);
        let credit = round_money(line.credit_amount);

        if debit < Decimal::ZERO || credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: position });
        }
        match (debit.is_zero(), credit.is_zero()) {
            (true, true) => return Err(LedgerError::ZeroAmount { line: position }),
            (false, false) => return Err(LedgerError::BothSides { line: position }),
            _ => {}
        }

        totals.add(debit, credit);
        validated.push(ValidatedLine {
            line_number: i32::try_from(position).unwrap_or(i32::MAX),
            account_id: line.account_id,
            debit_amount: debit,
            credit_amount: credit,
            description: line.description.clone(),
            reference: line.reference.clone(),
            dimensions: line.dimensions,
        });
    }

    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok((validated, totals))
}

/// Folds lines into one movement per account, ordered by account id.
///
/// The ascending order is the lock order used when the movements are applied.
#[must_use]
pub fn aggregate_movements(lines: &[ValidatedLine]) -> Vec<AccountMovement> {
    let mut per_account: BTreeMap<Uuid, (Decimal, Decimal)> = BTreeMap::new();
    for line in lines {
        let slot = per_account.entry(line.account_id).or_default();
        slot.0 += line.debit_amount;
        slot.1 += line.credit_amount;
    }

    per_account
        .into_iter()
        .map(|(account_id, (debit, credit))| AccountMovement {
            account_id,
            debit,
            credit,
        })
        .collect()
}
