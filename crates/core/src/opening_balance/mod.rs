//! Opening balances: one-time seeding of account balances as of a date.

pub mod state;
pub mod types;

pub use state::OpeningBalanceStatus;
pub use types::{OpeningBalanceDetailInput, OpeningBalanceInput, validate_details};
