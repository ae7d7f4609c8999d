//! Ledger repository: records, voids and queries ledger entries.
//!
//! Recording and voiding write the entry and fold its movement into the
//! trial balance inside one transaction, under the period's shared lock.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Utc};
use neraca_core::ledger::{
    EntryTotals, LedgerEntryInput, LedgerService, LedgerSummary, ValidatedLine,
    aggregate_movements,
};
use neraca_core::period::Period;
use neraca_core::{LedgerError, LedgerSettings, ledger};
use neraca_shared::types::{LedgerEntryId, PageMeta, PageRequest, round_money};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::period::find_containing;
use super::trial_balance::{Bucket, apply_movements, lock_accounts};
use crate::entities::{
    accounts, ledger_entries, ledger_lines, periods, sea_orm_active_enums::EntryStatus,
};
use crate::error::RepositoryError;
use crate::locks::PeriodLocks;

/// A ledger entry header with its lines ordered by line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntryRecord {
    /// Entry header.
    pub entry: ledger_entries::Model,
    /// Entry lines.
    pub lines: Vec<ledger_lines::Model>,
}

impl LedgerEntryRecord {
    /// Debit and credit totals of the lines.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        self.lines.iter().fold(EntryTotals::default(), |mut totals, line| {
            totals.add(line.debit_amount, line.credit_amount);
            totals
        })
    }
}

/// Filter for [`LedgerRepository::query`].
#[derive(Debug, Clone, Default)]
pub struct LedgerQuery {
    /// Entries of this period.
    pub period_id: Option<Uuid>,
    /// Entries dated on or after this day.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before this day.
    pub date_to: Option<NaiveDate>,
    /// Substring match on ledger number, description or reference number.
    pub search: Option<String>,
    /// Entries with at least one line on this account.
    pub account_id: Option<Uuid>,
    /// Entries with at least one line whose account code or name matches.
    pub account_search: Option<String>,
    /// Entry status; posted entries when absent.
    pub status: Option<ledger::EntryStatus>,
    /// Page to return.
    pub page: PageRequest,
}

/// Result of [`LedgerRepository::query`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQueryResult {
    /// Entries of the requested page, newest first.
    pub entries: Vec<LedgerEntryRecord>,
    /// Pagination metadata.
    pub meta: PageMeta,
    /// Aggregates over every filtered entry, not just this page.
    pub summary: LedgerSummary,
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    locks: PeriodLocks,
    settings: LedgerSettings,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: PeriodLocks, settings: LedgerSettings) -> Self {
        Self { db, locks, settings }
    }

    /// Records a balanced entry and applies it to the trial balance.
    ///
    /// The period is `input.period_id` or, when absent, the period containing
    /// the transaction date. Entry, lines and row updates commit together.
    ///
    /// # Errors
    ///
    /// - `NoPostingPeriod` if no period contains the date
    /// - `PeriodClosed` / `DateOutsidePeriod` if the period cannot accept it
    /// - `Unbalanced` if Σ debit ≠ Σ credit
    /// - Line validation errors, `UnknownAccount`, `AccountInactive`
    /// - `DuplicateLedgerNumber` if the number is already used
    /// - Database errors; nothing is written in that case
    pub async fn record_entry(
        &self,
        input: LedgerEntryInput,
    ) -> Result<LedgerEntryRecord, RepositoryError> {
        let result = self.try_record(&input).await;
        if let Err(err) = &result {
            warn!(
                ledger_number = %input.ledger_number,
                transaction_date = %input.transaction_date,
                error = %err,
                "Ledger entry rejected"
            );
        }
        result
    }

    async fn try_record(&self, input: &LedgerEntryInput) -> Result<LedgerEntryRecord, RepositoryError> {
        let period_id = match input.period_id {
            Some(id) => id,
            None => find_containing(&self.db, input.transaction_date)
                .await?
                .map(|p| p.id)
                .ok_or(LedgerError::NoPostingPeriod(input.transaction_date))?,
        };

        let _guard = self.locks.shared(period_id).await;
        let txn = self.db.begin().await?;

        let period = periods::Entity::find_by_id(period_id)
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or(LedgerError::PeriodNotFound(period_id))?;

        let accounts = lock_accounts(&txn, input.lines.iter().map(|l| l.account_id)).await?;
        let prepared = LedgerService::prepare_entry(input, &Period::from(&period), |id| {
            accounts.get(&id).map(accounts::Model::info)
        })?;

        let ledger_number = input.ledger_number.trim().to_string();
        let taken = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::LedgerNumber.eq(&ledger_number))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(LedgerError::DuplicateLedgerNumber(ledger_number).into());
        }

        let entry_id = LedgerEntryId::new().into_inner();
        let header = ledger_entries::ActiveModel {
            id: Set(entry_id),
            ledger_number: Set(ledger_number.clone()),
            transaction_date: Set(input.transaction_date),
            period_id: Set(period.id),
            status: Set(EntryStatus::Posted),
            reference_number: Set(input.reference_number.clone()),
            description: Set(input.description.clone()),
            voided_at: Set(None),
            void_reason: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let entry = header.insert(&txn).await.map_err(|e| {
            let err = RepositoryError::from(e);
            if err.is_unique_violation() {
                LedgerError::DuplicateLedgerNumber(ledger_number.clone()).into()
            } else {
                err
            }
        })?;

        let mut lines = Vec::with_capacity(prepared.lines.len());
        for line in &prepared.lines {
            lines.push(line_model(entry_id, line).insert(&txn).await?);
        }

        apply_movements(
            &txn,
            &self.settings.calendar,
            &period,
            Bucket::Period,
            &prepared.movements,
            &accounts,
        )
        .await?;

        txn.commit().await?;

        info!(
            entry_id = %entry.id,
            ledger_number = %entry.ledger_number,
            period_id = %period.id,
            lines = lines.len(),
            total = %prepared.totals.debit,
            "Ledger entry recorded"
        );
        Ok(LedgerEntryRecord { entry, lines })
    }

    /// Finds an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<LedgerEntryRecord>, RepositoryError> {
        let Some(entry) = ledger_entries::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let lines = lines_of(&self.db, id).await?;
        Ok(Some(LedgerEntryRecord { entry, lines }))
    }

    /// Voids a posted entry and reverses its movement in the trial balance.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist
    /// - `EntryAlreadyVoided` if it was voided before
    /// - `PeriodClosed` if its period is closed
    /// - Database errors; nothing is written in that case
    pub async fn void_entry(&self, id: Uuid, reason: &str) -> Result<LedgerEntryRecord, RepositoryError> {
        let entry = ledger_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let _guard = self.locks.shared(entry.period_id).await;
        let txn = self.db.begin().await?;

        let entry = ledger_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let period = periods::Entity::find_by_id(entry.period_id)
            .lock_shared()
            .one(&txn)
            .await?
            .ok_or(LedgerError::PeriodNotFound(entry.period_id))?;

        LedgerService::validate_can_void(id, entry.status.into(), &Period::from(&period))?;

        let lines = lines_of(&txn, id).await?;
        let validated: Vec<ValidatedLine> = lines.iter().map(ledger_lines::Model::to_validated).collect();
        let reversal: Vec<_> = aggregate_movements(&validated)
            .into_iter()
            .map(ledger::AccountMovement::reversed)
            .collect();
        let accounts = lock_accounts(&txn, reversal.iter().map(|m| m.account_id)).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let voided = ledger_entries::Entity::update_many()
            .col_expr(ledger_entries::Column::Status, Expr::value(EntryStatus::Voided))
            .col_expr(ledger_entries::Column::VoidedAt, Expr::value(now))
            .col_expr(ledger_entries::Column::VoidReason, Expr::value(reason))
            .filter(ledger_entries::Column::Id.eq(id))
            .filter(ledger_entries::Column::Status.eq(EntryStatus::Posted))
            .exec(&txn)
            .await?;
        if voided.rows_affected != 1 {
            return Err(LedgerError::EntryAlreadyVoided(id).into());
        }

        apply_movements(
            &txn,
            &self.settings.calendar,
            &period,
            Bucket::Period,
            &reversal,
            &accounts,
        )
        .await?;

        let entry = ledger_entries::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        txn.commit().await?;

        info!(entry_id = %id, period_id = %period.id, reason, "Ledger entry voided");
        Ok(LedgerEntryRecord { entry, lines })
    }

    /// Queries entries with pagination and full-set aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn query(&self, query: LedgerQuery) -> Result<LedgerQueryResult, RepositoryError> {
        let filtered = filtered_entries(&query);
        let total = filtered.clone().count(&self.db).await?;

        let matching_ids = filtered
            .clone()
            .select_only()
            .column(ledger_entries::Column::Id)
            .into_query();
        let per_entry = ledger_lines::Entity::find()
            .select_only()
            .column_as(Expr::col(ledger_lines::Column::DebitAmount).sum(), "debit")
            .column_as(Expr::col(ledger_lines::Column::CreditAmount).sum(), "credit")
            .filter(ledger_lines::Column::EntryId.in_subquery(matching_ids))
            .group_by(ledger_lines::Column::EntryId)
            .into_model::<EntrySums>()
            .all(&self.db)
            .await?;
        let summary = LedgerSummary::summarize(
            total,
            per_entry.into_iter().map(EntrySums::into_totals),
            self.settings.balance_tolerance,
        );

        let page = filtered
            .order_by_desc(ledger_entries::Column::TransactionDate)
            .order_by_desc(ledger_entries::Column::LedgerNumber)
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await?;

        let page_ids: BTreeSet<Uuid> = page.iter().map(|e| e.id).collect();
        let mut lines_by_entry: BTreeMap<Uuid, Vec<ledger_lines::Model>> = BTreeMap::new();
        if !page_ids.is_empty() {
            let lines = ledger_lines::Entity::find()
                .filter(ledger_lines::Column::EntryId.is_in(page_ids))
                .order_by_asc(ledger_lines::Column::LineNumber)
                .all(&self.db)
                .await?;
            for line in lines {
                lines_by_entry.entry(line.entry_id).or_default().push(line);
            }
        }

        let entries = page
            .into_iter()
            .map(|entry| {
                let lines = lines_by_entry.remove(&entry.id).unwrap_or_default();
                LedgerEntryRecord { entry, lines }
            })
            .collect();

        Ok(LedgerQueryResult {
            entries,
            meta: PageMeta::new(query.page, total),
            summary,
        })
    }
}

/// Σ debit and Σ credit of one entry's lines.
#[derive(Debug, FromQueryResult)]
struct EntrySums {
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

impl EntrySums {
    fn into_totals(self) -> EntryTotals {
        EntryTotals::new(
            round_money(self.debit.unwrap_or_default()),
            round_money(self.credit.unwrap_or_default()),
        )
    }
}

fn filtered_entries(query: &LedgerQuery) -> Select<ledger_entries::Entity> {
    let status = EntryStatus::from(query.status.unwrap_or(ledger::EntryStatus::Posted));
    let mut select = ledger_entries::Entity::find().filter(ledger_entries::Column::Status.eq(status));

    if let Some(period_id) = query.period_id {
        select = select.filter(ledger_entries::Column::PeriodId.eq(period_id));
    }
    if let Some(from) = query.date_from {
        select = select.filter(ledger_entries::Column::TransactionDate.gte(from));
    }
    if let Some(to) = query.date_to {
        select = select.filter(ledger_entries::Column::TransactionDate.lte(to));
    }
    if let Some(search) = non_blank(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(ledger_entries::Column::LedgerNumber.contains(search))
                .add(ledger_entries::Column::Description.contains(search))
                .add(ledger_entries::Column::ReferenceNumber.contains(search)),
        );
    }
    if let Some(account_id) = query.account_id {
        let with_account = ledger_lines::Entity::find()
            .select_only()
            .column(ledger_lines::Column::EntryId)
            .filter(ledger_lines::Column::AccountId.eq(account_id))
            .into_query();
        select = select.filter(ledger_entries::Column::Id.in_subquery(with_account));
    }
    if let Some(search) = non_blank(query.account_search.as_deref()) {
        let with_matching_account = ledger_lines::Entity::find()
            .select_only()
            .column(ledger_lines::Column::EntryId)
            .inner_join(accounts::Entity)
            .filter(
                Condition::any()
                    .add(accounts::Column::Code.contains(search))
                    .add(accounts::Column::Name.contains(search)),
            )
            .into_query();
        select = select.filter(ledger_entries::Column::Id.in_subquery(with_matching_account));
    }
    select
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

async fn lines_of<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<ledger_lines::Model>, RepositoryError> {
    Ok(ledger_lines::Entity::find()
        .filter(ledger_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(ledger_lines::Column::LineNumber)
        .all(conn)
        .await?)
}

fn line_model(entry_id: Uuid, line: &ValidatedLine) -> ledger_lines::ActiveModel {
    ledger_lines::ActiveModel {
        id: Set(Uuid::now_v7()),
        entry_id: Set(entry_id),
        line_number: Set(line.line_number),
        account_id: Set(line.account_id),
        debit_amount: Set(line.debit_amount),
        credit_amount: Set(line.credit_amount),
        description: Set(line.description.clone()),
        reference: Set(line.reference.clone()),
        project_id: Set(line.dimensions.project_id),
        customer_id: Set(line.dimensions.customer_id),
        supplier_id: Set(line.dimensions.supplier_id),
        employee_id: Set(line.dimensions.employee_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neraca_core::ledger::Dimensions;
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  cash ")), Some("cash"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_line_model_copies_dimensions() {
        let project = Uuid::new_v4();
        let line = ValidatedLine {
            line_number: 2,
            account_id: Uuid::new_v4(),
            debit_amount: dec!(0),
            credit_amount: dec!(75),
            description: Some("freight".to_string()),
            reference: None,
            dimensions: Dimensions {
                project_id: Some(project),
                ..Dimensions::default()
            },
        };
        let model = line_model(Uuid::nil(), &line);
        assert!(matches!(model.line_number, ActiveValue::Set(2)));
        assert!(matches!(model.project_id, ActiveValue::Set(Some(id)) if id == project));
        assert!(matches!(model.customer_id, ActiveValue::Set(None)));
    }

    #[test]
    fn test_record_totals() {
        let line = |debit, credit| ledger_lines::Model {
            id: Uuid::new_v4(),
            entry_id: Uuid::nil(),
            line_number: 1,
            account_id: Uuid::new_v4(),
            debit_amount: debit,
            credit_amount: credit,
            description: None,
            reference: None,
            project_id: None,
            customer_id: None,
            supplier_id: None,
            employee_id: None,
        };
        let record = LedgerEntryRecord {
            entry: ledger_entries::Model {
                id: Uuid::nil(),
                ledger_number: "JV-1".to_string(),
                transaction_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                period_id: Uuid::nil(),
                status: EntryStatus::Posted,
                reference_number: None,
                description: String::new(),
                voided_at: None,
                void_reason: None,
                created_at: Utc::now().into(),
            },
            lines: vec![line(dec!(500), dec!(0)), line(dec!(0), dec!(500))],
        };
        assert_eq!(record.totals(), EntryTotals::new(dec!(500), dec!(500)));
    }
}
