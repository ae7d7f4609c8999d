//! Ledger service for entry validation and preparation.
//!
//! This module provides the core business logic for validating ledger entries
//! before they are persisted and folded into the trial balance.

use std::collections::HashSet;

use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountMovement, EntryStatus, EntryTotals, LedgerEntryInput, ValidatedLine};
use super::validation::{aggregate_movements, validate_lines};
use crate::account::NormalBalance;
use crate::period::Period;

/// Information about an account needed for validation.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Balance direction.
    pub normal_balance: NormalBalance,
    /// Whether the account is active.
    pub is_active: bool,
}

/// An entry that passed every check and is ready to persist.
#[derive(Debug, Clone)]
pub struct PreparedEntry {
    /// Numbered, rounded lines.
    pub lines: Vec<ValidatedLine>,
    /// Entry totals (always balanced).
    pub totals: EntryTotals,
    /// Per-account movement, ascending by account id.
    pub movements: Vec<AccountMovement>,
}

impl PreparedEntry {
    /// Accounts touched by the entry, ascending.
    #[must_use]
    pub fn account_ids(&self) -> Vec<Uuid> {
        self.movements.iter().map(|m| m.account_id).collect()
    }
}

/// Ledger service for entry validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates an entry against its target period and the chart of accounts.
    ///
    /// Steps:
    /// 1. Ledger number is present
    /// 2. Lines are well formed and balanced (see [`validate_lines`])
    /// 3. Every account exists and is active
    /// 4. The period is open and contains the transaction date
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` found. Nothing has been written at
    /// this point.
    pub fn prepare_entry<A>(
        input: &LedgerEntryInput,
        period: &Period,
        account_lookup: A,
    ) -> Result<PreparedEntry, LedgerError>
    where
        A: Fn(Uuid) -> Option<AccountInfo>,
    {
        if input.ledger_number.trim().is_empty() {
            return Err(LedgerError::MissingLedgerNumber);
        }

        let (lines, totals) = validate_lines(&input.lines)?;

        let mut checked = HashSet::new();
        for line in &lines {
            if !checked.insert(line.account_id) {
                continue;
            }
            let info = account_lookup(line.account_id).ok_or(LedgerError::UnknownAccount {
                line: usize::try_from(line.line_number).unwrap_or_default(),
                account_id: line.account_id,
            })?;
            if !info.is_active {
                return Err(LedgerError::AccountInactive(info.id));
            }
        }

        period.ensure_accepts(input.transaction_date)?;

        let movements = aggregate_movements(&lines);
        Ok(PreparedEntry {
            lines,
            totals,
            movements,
        })
    }

    /// Validates that an entry can be voided.
    ///
    /// # Errors
    ///
    /// - `EntryAlreadyVoided` if the entry is already voided
    /// - `PeriodClosed` if its period is closed
    pub fn validate_can_void(
        entry_id: Uuid,
        status: EntryStatus,
        period: &Period,
    ) -> Result<(), LedgerError> {
        if status == EntryStatus::Voided {
            return Err(LedgerError::EntryAlreadyVoided(entry_id));
        }
        if period.is_closed {
            return Err(LedgerError::PeriodClosed(period.id));
        }
        Ok(())
    }
}
