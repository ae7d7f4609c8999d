//! Full-set aggregates returned alongside a page of ledger entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::EntryTotals;

/// Totals over every entry matching a query, independent of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Number of matching entries.
    pub entry_count: u64,
    /// Σ debit over all lines of matching entries.
    pub total_debit: Decimal,
    /// Σ credit over all lines of matching entries.
    pub total_credit: Decimal,
    /// Entries with |Σdebit − Σcredit| below the tolerance.
    pub balanced_count: u64,
    /// Entries at or above the tolerance.
    pub unbalanced_count: u64,
}

impl LedgerSummary {
    /// Builds the summary from per-entry totals.
    ///
    /// Entries without lines count as balanced with zero totals.
    #[must_use]
    pub fn summarize<I>(entry_count: u64, per_entry: I, tolerance: Decimal) -> Self
    where
        I: IntoIterator<Item = EntryTotals>,
    {
        let mut summary = Self {
            entry_count,
            ..Self::default()
        };
        let mut unbalanced = 0u64;
        for totals in per_entry {
            summary.total_debit += totals.debit;
            summary.total_credit += totals.credit;
            if !totals.is_balanced_within(tolerance) {
                unbalanced += 1;
            }
        }
        summary.unbalanced_count = unbalanced.min(entry_count);
        summary.balanced_count = entry_count - summary.unbalanced_count;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summarize_counts_within_tolerance() {
        let summary = LedgerSummary::summarize(
            3,
            vec![
                EntryTotals::new(dec!(100), dec!(100)),
                EntryTotals::new(dec!(50.005), dec!(50)),
                EntryTotals::new(dec!(500), dec!(400)),
            ],
            dec!(0.01),
        );

        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.total_debit, dec!(650.005));
        assert_eq!(summary.total_credit, dec!(550));
        assert_eq!(summary.balanced_count, 2);
        assert_eq!(summary.unbalanced_count, 1);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = LedgerSummary::summarize(0, Vec::new(), dec!(0.01));
        assert_eq!(summary, LedgerSummary::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(LedgerSummary::default()).unwrap();
        assert!(json.get("balancedCount").is_some());
        assert!(json.get("totalDebit").is_some());
    }
}
