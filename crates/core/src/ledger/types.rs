//! Ledger domain types for entry creation and validation.
//!
//! This module defines the core types used for recording balanced ledger
//! entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use neraca_shared::types::within_tolerance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger entry status.
///
/// Entries are recorded directly as posted; voiding is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is part of the books and counted by the aggregator.
    Posted,
    /// Entry has been voided; its movement has been reversed.
    Voided,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "posted" => Some(Self::Posted),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }

    /// Returns true if the entry contributes to balances.
    #[must_use]
    pub fn counts_toward_balances(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// Optional business dimensions attached to a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Project reference.
    pub project_id: Option<Uuid>,
    /// Customer reference.
    pub customer_id: Option<Uuid>,
    /// Supplier reference.
    pub supplier_id: Option<Uuid>,
    /// Employee reference.
    pub employee_id: Option<Uuid>,
}

/// Input for a single ledger line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount (zero on credit lines).
    pub debit_amount: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit_amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Optional external reference (e.g. invoice number).
    pub reference: Option<String>,
    /// Business dimensions.
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl LedgerLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
            reference: None,
            dimensions: Dimensions::default(),
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
            reference: None,
            dimensions: Dimensions::default(),
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the business dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// Input for recording a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryInput {
    /// Unique ledger number (e.g. "JV/2025/01/0001").
    pub ledger_number: String,
    /// The date of the transaction.
    pub transaction_date: NaiveDate,
    /// Target period; resolved from the date when absent.
    pub period_id: Option<Uuid>,
    /// Optional reference number of the originating document.
    pub reference_number: Option<String>,
    /// A description of the transaction.
    pub description: String,
    /// The lines (at least 2).
    pub lines: Vec<LedgerLineInput>,
}

/// A line that passed validation, numbered and rounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    /// 1-based position within the entry.
    pub line_number: i32,
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit amount, rounded to the money scale.
    pub debit_amount: Decimal,
    /// Credit amount, rounded to the money scale.
    pub credit_amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Business dimensions.
    pub dimensions: Dimensions,
}

/// Debit and credit totals of one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Adds one line's amounts.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Exact balance check used when recording.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }

    /// Tolerant balance check used by reporting aggregates.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal) -> bool {
        within_tolerance(self.debit, self.credit, tolerance)
    }
}

/// Net movement of one account within one entry (or one rebuild).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMovement {
    /// The account moved.
    pub account_id: Uuid,
    /// Debit total.
    pub debit: Decimal,
    /// Credit total.
    pub credit: Decimal,
}

impl AccountMovement {
    /// Returns the same movement with both sides negated.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            account_id: self.account_id,
            debit: -self.debit,
            credit: -self.credit,
        }
    }
}
