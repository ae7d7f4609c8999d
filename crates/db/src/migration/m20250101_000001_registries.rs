//! Account and period registries.

use sea_orm_migration::prelude::*;

use super::created_at;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Code)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::NormalBalance).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(created_at(Accounts::CreatedAt))
                    .col(created_at(Accounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Periods::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Periods::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Periods::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Periods::StartDate).date().not_null())
                    .col(ColumnDef::new(Periods::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Periods::IsClosed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Periods::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(created_at(Periods::CreatedAt))
                    .col(created_at(Periods::UpdatedAt))
                    .check(Expr::col(Periods::StartDate).lte(Expr::col(Periods::EndDate)))
                    .to_owned(),
            )
            .await?;

        // Lookup of the period containing a date
        manager
            .create_index(
                Index::create()
                    .name("idx_periods_range")
                    .table(Periods::Table)
                    .col(Periods::StartDate)
                    .col(Periods::EndDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Periods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    NormalBalance,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Periods {
    Table,
    Id,
    Name,
    StartDate,
    EndDate,
    IsClosed,
    ClosedAt,
    CreatedAt,
    UpdatedAt,
}
