//! Chart of accounts.
//!
//! Accounts are static reference data. The only property the ledger core
//! computes with is the account's normal balance direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Maximum length of an account code.
pub const MAX_ACCOUNT_CODE_LEN: usize = 20;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the conventional normal balance for this account type.
    ///
    /// - Asset/Expense: debit-increasing
    /// - Liability/Equity/Revenue: credit-increasing
    #[must_use]
    pub const fn default_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Whether an account's balance increases with debits or with credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalBalance {
    /// Increases are recorded as debits.
    Debit,
    /// Increases are recorded as credits.
    Credit,
}

impl NormalBalance {
    /// Returns the uppercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }

    /// Signed balance of `debit`/`credit` in this direction.
    ///
    /// Positive means the balance sits on the normal side.
    #[must_use]
    pub fn net(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Splits a signed net back into `(debit, credit)` columns, one of them zero.
    #[must_use]
    pub fn split(self, net: Decimal) -> (Decimal, Decimal) {
        let normal_side = net.max(Decimal::ZERO);
        let other_side = (-net).max(Decimal::ZERO);
        match self {
            Self::Debit => (normal_side, other_side),
            Self::Credit => (other_side, normal_side),
        }
    }
}

impl std::str::FromStr for NormalBalance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBIT" => Ok(Self::Debit),
            "CREDIT" => Ok(Self::Credit),
            other => Err(format!("unknown normal balance: {other}")),
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: Uuid,
    /// Unique account code (e.g. "1100").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Balance direction.
    pub normal_balance: NormalBalance,
    /// Whether the account accepts new postings.
    pub is_active: bool,
}

/// Validates an account code: non-blank, at most 20 characters of
/// ASCII alphanumerics, `-` or `.`.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAccountCode` on any violation.
pub fn validate_account_code(code: &str) -> Result<(), LedgerError> {
    let trimmed = code.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.len() == code.len()
        && code.len() <= MAX_ACCOUNT_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if well_formed {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccountCode(code.to_string()))
    }
}
