//! Opening balances and their details.

use sea_orm_migration::prelude::*;

use super::{created_at, money};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OpeningBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OpeningBalances::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OpeningBalances::AsOfDate).date().not_null())
                    .col(ColumnDef::new(OpeningBalances::Description).text().not_null())
                    .col(
                        ColumnDef::new(OpeningBalances::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(OpeningBalances::PeriodId).uuid().null())
                    .col(
                        ColumnDef::new(OpeningBalances::PostedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(OpeningBalances::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(created_at(OpeningBalances::CreatedAt))
                    .col(created_at(OpeningBalances::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opening_balances_period")
                            .from(OpeningBalances::Table, OpeningBalances::PeriodId)
                            .to(Periods::Table, Periods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OpeningBalanceDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OpeningBalanceDetails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OpeningBalanceDetails::OpeningBalanceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OpeningBalanceDetails::AccountId).uuid().not_null())
                    .col(money(manager, OpeningBalanceDetails::Debit))
                    .col(money(manager, OpeningBalanceDetails::Credit))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opening_balance_details_header")
                            .from(
                                OpeningBalanceDetails::Table,
                                OpeningBalanceDetails::OpeningBalanceId,
                            )
                            .to(OpeningBalances::Table, OpeningBalances::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opening_balance_details_account")
                            .from(OpeningBalanceDetails::Table, OpeningBalanceDetails::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_opening_balance_details_account")
                    .table(OpeningBalanceDetails::Table)
                    .col(OpeningBalanceDetails::OpeningBalanceId)
                    .col(OpeningBalanceDetails::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OpeningBalanceDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OpeningBalances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OpeningBalances {
    Table,
    Id,
    AsOfDate,
    Description,
    Status,
    PeriodId,
    PostedAt,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OpeningBalanceDetails {
    Table,
    Id,
    OpeningBalanceId,
    AccountId,
    Debit,
    Credit,
}

#[derive(DeriveIden)]
enum Periods {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
}
