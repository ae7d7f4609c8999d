//! Trial-balance rows, the derived per-(period, account) aggregate.

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
                    .table(TrialBalanceRows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrialBalanceRows::PeriodId).uuid().not_null())
                    .col(ColumnDef::new(TrialBalanceRows::AccountId).uuid().not_null())
                    .col(money(manager, TrialBalanceRows::OpeningDebit))
                    .col(money(manager, TrialBalanceRows::OpeningCredit))
                    .col(money(manager, TrialBalanceRows::PeriodDebit))
                    .col(money(manager, TrialBalanceRows::PeriodCredit))
                    .col(money(manager, TrialBalanceRows::EndingDebit))
                    .col(money(manager, TrialBalanceRows::EndingCredit))
                    .col(money(manager, TrialBalanceRows::YtdDebit))
                    .col(money(manager, TrialBalanceRows::YtdCredit))
                    .col(created_at(TrialBalanceRows::CalculatedAt))
                    .primary_key(
                        Index::create()
                            .col(TrialBalanceRows::PeriodId)
                            .col(TrialBalanceRows::AccountId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trial_balance_rows_period")
                            .from(TrialBalanceRows::Table, TrialBalanceRows::PeriodId)
                            .to(Periods::Table, Periods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trial_balance_rows_account")
                            .from(TrialBalanceRows::Table, TrialBalanceRows::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trial_balance_rows_account")
                    .table(TrialBalanceRows::Table)
                    .col(TrialBalanceRows::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrialBalanceRows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrialBalanceRows {
    Table,
    PeriodId,
    AccountId,
    OpeningDebit,
    OpeningCredit,
    PeriodDebit,
    PeriodCredit,
    EndingDebit,
    EndingCredit,
    YtdDebit,
    YtdCredit,
    CalculatedAt,
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
