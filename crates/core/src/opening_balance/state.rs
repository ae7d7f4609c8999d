//! Opening-balance lifecycle state machine.
//!
//! The valid transitions are:
//! - Draft → Draft (update)
//! - Draft → Posted (post, terminal)
//! - Draft → Deleted (delete, terminal)

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Opening-balance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningBalanceStatus {
    /// Editable, not yet applied.
    Draft,
    /// Applied to the trial balance exactly once.
    Posted,
    /// Soft-deleted.
    Deleted,
}

impl OpeningBalanceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns true if the record may still be changed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Checks the record accepts `update`, `post` or `delete`.
    ///
    /// All three transitions leave `Draft`, so they share one guard.
    ///
    /// # Errors
    ///
    /// - `AlreadyPosted` if posted
    /// - `OpeningBalanceNotFound` if deleted
    pub fn ensure_draft(self, id: Uuid) -> Result<(), LedgerError> {
        match self {
            Self::Draft => Ok(()),
            Self::Posted => Err(LedgerError::AlreadyPosted(id)),
            Self::Deleted => Err(LedgerError::OpeningBalanceNotFound(id)),
        }
    }
}

impl fmt::Display for OpeningBalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OpeningBalanceStatus::Draft, "draft")]
    #[case(OpeningBalanceStatus::Posted, "posted")]
    #[case(OpeningBalanceStatus::Deleted, "deleted")]
    fn test_status_strings(#[case] status: OpeningBalanceStatus, #[case] text: &str) {
        assert_eq!(status.as_str(), text);
        assert_eq!(OpeningBalanceStatus::parse(text), Some(status));
        assert_eq!(status.to_string(), text);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(OpeningBalanceStatus::parse("void"), None);
    }

    #[test]
    fn test_only_draft_transitions() {
        let id = Uuid::new_v4();
        assert!(OpeningBalanceStatus::Draft.ensure_draft(id).is_ok());
        assert!(matches!(
            OpeningBalanceStatus::Posted.ensure_draft(id),
            Err(LedgerError::AlreadyPosted(x)) if x == id
        ));
        assert!(matches!(
            OpeningBalanceStatus::Deleted.ensure_draft(id),
            Err(LedgerError::OpeningBalanceNotFound(x)) if x == id
        ));
    }

    #[test]
    fn test_is_editable() {
        assert!(OpeningBalanceStatus::Draft.is_editable());
        assert!(!OpeningBalanceStatus::Posted.is_editable());
        assert!(!OpeningBalanceStatus::Deleted.is_editable());
    }
}
