//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod ledger_entries;
pub mod ledger_lines;
pub mod opening_balance_details;
pub mod opening_balances;
pub mod periods;
pub mod sea_orm_active_enums;
pub mod trial_balance_rows;
