//! Ledger error types for validation and state errors.
//!
//! Every failure the ledger core can report lives in [`LedgerError`]. Each
//! variant belongs to exactly one [`ErrorKind`], which is what callers branch on.

use chrono::NaiveDate;
use neraca_shared::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of ledger failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Σdebit ≠ Σcredit.
    UnbalancedEntry,
    /// Target period is closed or the date has no posting period.
    ClosedPeriod,
    /// No open period contains the requested date.
    NoOpenPeriod,
    /// Invalid opening-balance transition.
    AlreadyPosted,
    /// Unknown id.
    NotFound,
    /// Underlying transactional store failure.
    Store,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Ledger entry must have at least 2 lines")]
    InsufficientLines,

    /// Ledger number is blank.
    #[error("Ledger number is required")]
    MissingLedgerNumber,

    /// Ledger number already used by another entry.
    #[error("Ledger number {0} already exists")]
    DuplicateLedgerNumber(String),

    /// Line amount cannot be negative.
    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Line carries neither a debit nor a credit.
    #[error("Line {line}: debit or credit amount is required")]
    ZeroAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Line carries both a debit and a credit.
    #[error("Line {line}: must specify either debit or credit, not both")]
    BothSides {
        /// 1-based line number.
        line: usize,
    },

    /// Line references an account that does not exist.
    #[error("Line {line}: account {account_id} does not exist")]
    UnknownAccount {
        /// 1-based line number.
        line: usize,
        /// The missing account.
        account_id: Uuid,
    },

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account code is empty or malformed.
    #[error("Invalid account code: {0:?}")]
    InvalidAccountCode(String),

    /// Account code already exists.
    #[error("Account code {0} already exists")]
    DuplicateAccountCode(String),

    /// Account is referenced by posted lines and is immutable.
    #[error("Account {0} is referenced by ledger data and cannot be changed")]
    AccountInUse(Uuid),

    /// Start date is after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    /// Period range overlaps an existing period.
    #[error("Period overlaps existing period {0}")]
    OverlappingPeriod(String),

    /// Fiscal year start month outside 1..=12.
    #[error("Fiscal year start month must be between 1 and 12, got {0}")]
    InvalidFiscalMonth(u32),

    /// Opening balance has no detail lines.
    #[error("Opening balance must have at least one detail")]
    EmptyOpeningBalance,

    /// Same account listed twice in one opening balance.
    #[error("Account {0} appears more than once in the opening balance")]
    DuplicateOpeningAccount(Uuid),

    /// Entry has already been voided.
    #[error("Ledger entry {0} is already voided")]
    EntryAlreadyVoided(Uuid),

    // ========== Balance Errors ==========
    /// Entry is not balanced (debits != credits).
    #[error("Ledger entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Period Errors ==========
    /// Period is closed, no posting allowed.
    #[error("Period {0} is closed, no posting allowed")]
    PeriodClosed(Uuid),

    /// Transaction date falls outside the requested period.
    #[error("Date {date} falls outside period {period_id}")]
    DateOutsidePeriod {
        /// The transaction date.
        date: NaiveDate,
        /// The requested period.
        period_id: Uuid,
    },

    /// No period accepts postings for the date.
    #[error("No open period accepts postings dated {0}")]
    NoPostingPeriod(NaiveDate),

    /// No open period contains the date.
    #[error("No open period contains {0}")]
    NoOpenPeriod(NaiveDate),

    // ========== Lifecycle Errors ==========
    /// Opening balance has already been posted.
    #[error("Opening balance {0} is already posted")]
    AlreadyPosted(Uuid),

    // ========== Not Found ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Period not found.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Opening balance not found.
    #[error("Opening balance not found: {0}")]
    OpeningBalanceNotFound(Uuid),

    // ========== Store Errors ==========
    /// Transactional store failure; the whole unit of work was rolled back.
    #[error("Store error: {message}")]
    Store {
        /// Driver message.
        message: String,
        /// Whether the same request may succeed if retried.
        retryable: bool,
    },
}

impl LedgerError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientLines
            | Self::MissingLedgerNumber
            | Self::DuplicateLedgerNumber(_)
            | Self::NegativeAmount { .. }
            | Self::ZeroAmount { .. }
            | Self::BothSides { .. }
            | Self::UnknownAccount { .. }
            | Self::AccountInactive(_)
            | Self::InvalidAccountCode(_)
            | Self::DuplicateAccountCode(_)
            | Self::AccountInUse(_)
            | Self::InvalidDateRange { .. }
            | Self::OverlappingPeriod(_)
            | Self::InvalidFiscalMonth(_)
            | Self::EmptyOpeningBalance
            | Self::DuplicateOpeningAccount(_)
            | Self::EntryAlreadyVoided(_) => ErrorKind::Validation,
            Self::Unbalanced { .. } => ErrorKind::UnbalancedEntry,
            Self::PeriodClosed(_) | Self::DateOutsidePeriod { .. } | Self::NoPostingPeriod(_) => {
                ErrorKind::ClosedPeriod
            }
            Self::NoOpenPeriod(_) => ErrorKind::NoOpenPeriod,
            Self::AlreadyPosted(_) => ErrorKind::AlreadyPosted,
            Self::AccountNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::EntryNotFound(_)
            | Self::OpeningBalanceNotFound(_) => ErrorKind::NotFound,
            Self::Store { .. } => ErrorKind::Store,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::MissingLedgerNumber => "MISSING_LEDGER_NUMBER",
            Self::DuplicateLedgerNumber(_) => "DUPLICATE_LEDGER_NUMBER",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::BothSides { .. } => "INVALID_LINE_SIDES",
            Self::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OverlappingPeriod(_) => "OVERLAPPING_PERIOD",
            Self::InvalidFiscalMonth(_) => "INVALID_FISCAL_MONTH",
            Self::EmptyOpeningBalance => "EMPTY_OPENING_BALANCE",
            Self::DuplicateOpeningAccount(_) => "DUPLICATE_OPENING_ACCOUNT",
            Self::EntryAlreadyVoided(_) => "ENTRY_ALREADY_VOIDED",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::NoPostingPeriod(_) => "NO_POSTING_PERIOD",
            Self::NoOpenPeriod(_) => "NO_OPEN_PERIOD",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::OpeningBalanceNotFound(_) => "OPENING_BALANCE_NOT_FOUND",
            Self::Store { .. } => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            // 400 Bad Request - malformed input
            ErrorKind::Validation | ErrorKind::UnbalancedEntry => 400,
            // 404 Not Found
            ErrorKind::NotFound => 404,
            // 409 Conflict - one-way transition already taken
            ErrorKind::AlreadyPosted => 409,
            // 422 - well-formed but the period refuses it
            ErrorKind::ClosedPeriod | ErrorKind::NoOpenPeriod => 422,
            ErrorKind::Store if self.is_retryable() => 503,
            ErrorKind::Store => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { retryable: true, .. })
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation | ErrorKind::UnbalancedEntry => Self::Validation(message),
            ErrorKind::ClosedPeriod | ErrorKind::NoOpenPeriod => Self::BusinessRule(message),
            ErrorKind::AlreadyPosted => Self::Conflict(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Store if err.is_retryable() => Self::Unavailable(message),
            ErrorKind::Store => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::Unbalanced {
                debit: dec!(500),
                credit: dec!(400),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::AlreadyPosted(Uuid::nil()).error_code(),
            "ALREADY_POSTED"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            LedgerError::UnknownAccount {
                line: 1,
                account_id: Uuid::nil()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::NoPostingPeriod(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).kind(),
            ErrorKind::ClosedPeriod
        );
        assert_eq!(
            LedgerError::NoOpenPeriod(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).kind(),
            ErrorKind::NoOpenPeriod
        );
        assert_eq!(
            LedgerError::OpeningBalanceNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(LedgerError::PeriodClosed(Uuid::nil()).http_status_code(), 422);
        assert_eq!(LedgerError::AlreadyPosted(Uuid::nil()).http_status_code(), 409);
        assert_eq!(LedgerError::PeriodNotFound(Uuid::nil()).http_status_code(), 404);
        let transient = LedgerError::Store {
            message: "timeout".to_string(),
            retryable: true,
        };
        assert_eq!(transient.http_status_code(), 503);
        let fatal = LedgerError::Store {
            message: "constraint".to_string(),
            retryable: false,
        };
        assert_eq!(fatal.http_status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(
            LedgerError::Store {
                message: "deadlock".to_string(),
                retryable: true,
            }
            .is_retryable()
        );
        assert!(!LedgerError::InsufficientLines.is_retryable());
        assert!(!LedgerError::AlreadyPosted(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: dec!(500),
            credit: dec!(400),
        };
        assert_eq!(
            err.to_string(),
            "Ledger entry is not balanced. Debit: 500, Credit: 400"
        );

        let err = LedgerError::DateOutsidePeriod {
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            period_id: Uuid::nil(),
        };
        assert_eq!(
            err.to_string(),
            format!("Date 2025-02-01 falls outside period {}", Uuid::nil())
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::AlreadyPosted(Uuid::nil()).into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = LedgerError::NoOpenPeriod(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).into();
        assert_eq!(app.error_code(), "BUSINESS_RULE_VIOLATION");

        let app: AppError = LedgerError::Store {
            message: "pool timed out".to_string(),
            retryable: true,
        }
        .into();
        assert!(app.is_retryable());
    }
}
