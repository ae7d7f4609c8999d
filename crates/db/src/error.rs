//! Repository error type.

use neraca_core::{ErrorKind, LedgerError};
use neraca_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors returned by every repository in this crate.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Domain rule violation, detected before anything was written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database failure; the enclosing transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(err) => err.kind(),
            Self::Database(_) => ErrorKind::Store,
        }
    }

    /// Returns true if the same request may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Database(err) => is_transient(err),
        }
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }

    /// Converts into the domain taxonomy, folding database failures into
    /// `LedgerError::Store`.
    #[must_use]
    pub fn into_ledger(self) -> LedgerError {
        match self {
            Self::Ledger(err) => err,
            Self::Database(err) => LedgerError::Store {
                retryable: is_transient(&err),
                message: err.to_string(),
            },
        }
    }

    /// Returns true for a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Database(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }
}

/// Connection acquisition, deadlocks, serialization failures and SQLite
/// busy errors are transient.
fn is_transient(err: &DbErr) -> bool {
    if matches!(err, DbErr::ConnectionAcquire(_)) {
        return true;
    }
    let message = err.to_string().to_lowercase();
    ["deadlock", "could not serialize", "40001", "40p01", "database is locked", "pool timed out"]
        .iter()
        .any(|needle| message.contains(needle))
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        err.into_ledger().into()
    }
}
