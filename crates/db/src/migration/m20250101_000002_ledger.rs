//! Ledger entries and their lines.

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
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::LedgerNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::TransactionDate).date().not_null())
                    .col(ColumnDef::new(LedgerEntries::PeriodId).uuid().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Status)
                            .string_len(16)
                            .not_null()
                            .default("posted"),
                    )
                    .col(ColumnDef::new(LedgerEntries::ReferenceNumber).string_len(100).null())
                    .col(ColumnDef::new(LedgerEntries::Description).text().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::VoidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::VoidReason).text().null())
                    .col(created_at(LedgerEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_period")
                            .from(LedgerEntries::Table, LedgerEntries::PeriodId)
                            .to(Periods::Table, Periods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_period_date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::PeriodId)
                    .col(LedgerEntries::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LedgerLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LedgerLines::EntryId).uuid().not_null())
                    .col(ColumnDef::new(LedgerLines::LineNumber).integer().not_null())
                    .col(ColumnDef::new(LedgerLines::AccountId).uuid().not_null())
                    .col(money(manager, LedgerLines::DebitAmount))
                    .col(money(manager, LedgerLines::CreditAmount))
                    .col(ColumnDef::new(LedgerLines::Description).text().null())
                    .col(ColumnDef::new(LedgerLines::Reference).string_len(100).null())
                    .col(ColumnDef::new(LedgerLines::ProjectId).uuid().null())
                    .col(ColumnDef::new(LedgerLines::CustomerId).uuid().null())
                    .col(ColumnDef::new(LedgerLines::SupplierId).uuid().null())
                    .col(ColumnDef::new(LedgerLines::EmployeeId).uuid().null())
                    .check(
                        Expr::col(LedgerLines::DebitAmount)
                            .gte(0)
                            .and(Expr::col(LedgerLines::CreditAmount).gte(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_lines_entry")
                            .from(LedgerLines::Table, LedgerLines::EntryId)
                            .to(LedgerEntries::Table, LedgerEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_lines_account")
                            .from(LedgerLines::Table, LedgerLines::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_ledger_lines_entry_line")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::EntryId)
                    .col(LedgerLines::LineNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_account")
                    .table(LedgerLines::Table)
                    .col(LedgerLines::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    LedgerNumber,
    TransactionDate,
    PeriodId,
    Status,
    ReferenceNumber,
    Description,
    VoidedAt,
    VoidReason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LedgerLines {
    Table,
    Id,
    EntryId,
    LineNumber,
    AccountId,
    DebitAmount,
    CreditAmount,
    Description,
    Reference,
    ProjectId,
    CustomerId,
    SupplierId,
    EmployeeId,
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
