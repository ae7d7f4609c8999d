//! `SeaORM` Entity for ledger lines.

use neraca_core::ledger::{Dimensions, ValidatedLine};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_id: Uuid,
    pub line_number: i32,
    pub account_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_amount: Decimal,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub project_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_entries::Entity",
        from = "Column::EntryId",
        to = "super::ledger_entries::Column::Id",
        on_delete = "Cascade"
    )]
    LedgerEntries,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Business dimensions carried by the line.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            project_id: self.project_id,
            customer_id: self.customer_id,
            supplier_id: self.supplier_id,
            employee_id: self.employee_id,
        }
    }

    /// The stored line as a validated line, for replaying its movement.
    #[must_use]
    pub fn to_validated(&self) -> ValidatedLine {
        ValidatedLine {
            line_number: self.line_number,
            account_id: self.account_id,
            debit_amount: self.debit_amount,
            credit_amount: self.credit_amount,
            description: self.description.clone(),
            reference: self.reference.clone(),
            dimensions: self.dimensions(),
        }
    }
}
