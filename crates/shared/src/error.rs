//! Presentation-facing error type.
//!
//! Domain and repository errors fold into [`AppError`] at the boundary of
//! whatever surface exposes the ledger (CLI, HTTP, job runner).

use thiserror::Error;

/// Error categories a caller can act on.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or unbalanced input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Well-formed request refused by period state.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// One-way transition already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient store failure; the request may be retried.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Store failure that retrying will not fix.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// HTTP-style status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Unavailable(_) => 503,
            Self::Database(_) => 500,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
