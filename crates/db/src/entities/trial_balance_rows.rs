//! `SeaORM` Entity for trial-balance rows, keyed by (period, account).

use neraca_core::trial_balance::{Sides, TrialBalanceFigures};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trial_balance_rows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub period_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub period_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub period_credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ending_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ending_credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ytd_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ytd_credit: Decimal,
    pub calculated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::periods::Entity",
        from = "Column::PeriodId",
        to = "super::periods::Column::Id"
    )]
    Periods,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The row's figures as domain values.
    #[must_use]
    pub fn figures(&self) -> TrialBalanceFigures {
        TrialBalanceFigures {
            opening: Sides::new(self.opening_debit, self.opening_credit),
            period: Sides::new(self.period_debit, self.period_credit),
            ending: Sides::new(self.ending_debit, self.ending_credit),
            ytd: Sides::new(self.ytd_debit, self.ytd_credit),
        }
    }
}
