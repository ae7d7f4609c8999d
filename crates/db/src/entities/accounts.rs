//! `SeaORM` Entity for the chart of accounts.

use neraca_core::account::Account;
use neraca_core::ledger::AccountInfo;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountType, NormalBalance};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: NormalBalance,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_lines::Entity")]
    LedgerLines,
    #[sea_orm(has_many = "super::opening_balance_details::Entity")]
    OpeningBalanceDetails,
    #[sea_orm(has_many = "super::trial_balance_rows::Entity")]
    TrialBalanceRows,
}

impl Related<super::ledger_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerLines.def()
    }
}

impl Related<super::opening_balance_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpeningBalanceDetails.def()
    }
}

impl Related<super::trial_balance_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrialBalanceRows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Domain view of the account.
    #[must_use]
    pub fn to_domain(&self) -> Account {
        Account {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            account_type: self.account_type.into(),
            normal_balance: self.normal_balance.into(),
            is_active: self.is_active,
        }
    }

    /// What entry validation needs to know about the account.
    #[must_use]
    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            normal_balance: self.normal_balance.into(),
            is_active: self.is_active,
        }
    }
}
