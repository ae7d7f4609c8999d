//! String-backed enums stored in the ledger tables.
//!
//! Each mirrors a `neraca-core` enum and converts both ways.

use neraca_core::account;
use neraca_core::ledger;
use neraca_core::opening_balance;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Normal balance column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum NormalBalance {
    /// Debit-increasing.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    /// Credit-increasing.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

/// Ledger entry status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EntryStatus {
    /// Posted.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Voided.
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Opening balance status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OpeningBalanceStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Soft-deleted.
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

macro_rules! mirror_enum {
    ($db:ident <=> $module:ident :: $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> account::AccountType { Asset, Liability, Equity, Revenue, Expense });
mirror_enum!(NormalBalance <=> account::NormalBalance { Debit, Credit });
mirror_enum!(EntryStatus <=> ledger::EntryStatus { Posted, Voided });
mirror_enum!(OpeningBalanceStatus <=> opening_balance::OpeningBalanceStatus { Draft, Posted, Deleted });
