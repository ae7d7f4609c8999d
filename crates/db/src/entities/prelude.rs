//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::ledger_entries::Entity as LedgerEntries;
pub use super::ledger_lines::Entity as LedgerLines;
pub use super::opening_balance_details::Entity as OpeningBalanceDetails;
pub use super::opening_balances::Entity as OpeningBalances;
pub use super::periods::Entity as Periods;
pub use super::trial_balance_rows::Entity as TrialBalanceRows;
