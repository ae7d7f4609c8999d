//! Trial balance repository: incremental maintenance, reads and rebuilds.
//!
//! Every write to a row goes through [`apply_movements`], which increments the
//! row with a single upsert and then refreshes `ending` and the `ytd` chain of
//! the same account for the current and every later period of the fiscal
//! year. A row left all zero is deleted. [`TrialBalanceRepository::recalculate`]
//! rebuilds a period from the ledger log with the same arithmetic and the same
//! row set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, Utc};
use neraca_core::account::{self, NormalBalance};
use neraca_core::ledger::AccountMovement;
use neraca_core::period::FiscalCalendar;
use neraca_core::trial_balance::{
    AccountDrift, PeriodRebuild, RecalculationOutcome, Sides, TrialBalanceFigures,
    TrialBalanceTotals, detect_drift, ytd_chain,
};
use neraca_core::{LedgerError, LedgerSettings};
use neraca_shared::types::{PageMeta, PageRequest};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{
    accounts, ledger_entries, ledger_lines, opening_balance_details, opening_balances, periods,
    sea_orm_active_enums::{AccountType, EntryStatus, OpeningBalanceStatus},
    trial_balance_rows,
};
use crate::error::RepositoryError;
use crate::locks::PeriodLocks;

/// Which pair of columns a posting increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bucket {
    /// `opening_debit` / `opening_credit`, from opening-balance posts.
    Opening,
    /// `period_debit` / `period_credit`, from ledger entries and voids.
    Period,
}

impl Bucket {
    const fn columns(self) -> (trial_balance_rows::Column, trial_balance_rows::Column) {
        match self {
            Self::Opening => (
                trial_balance_rows::Column::OpeningDebit,
                trial_balance_rows::Column::OpeningCredit,
            ),
            Self::Period => (
                trial_balance_rows::Column::PeriodDebit,
                trial_balance_rows::Column::PeriodCredit,
            ),
        }
    }
}

/// Filter options for reading a trial balance.
#[derive(Debug, Clone, Default)]
pub struct TrialBalanceFilter {
    /// Only accounts of this type.
    pub account_type: Option<account::AccountType>,
    /// Substring match on account code or name.
    pub search: Option<String>,
    /// Page of lines to return; totals always cover every filtered line.
    pub page: Option<PageRequest>,
}

/// One account's row in a trial-balance read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account classification.
    pub account_type: account::AccountType,
    /// Balance direction.
    pub normal_balance: NormalBalance,
    /// Stored row values.
    #[serde(flatten)]
    pub figures: TrialBalanceFigures,
}

/// Result of [`TrialBalanceRepository::read`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceReport {
    /// The period read.
    pub period_id: Uuid,
    /// Lines ordered by account code.
    pub lines: Vec<TrialBalanceLine>,
    /// Pagination metadata when a page was requested.
    pub meta: Option<PageMeta>,
    /// Column totals over every filtered line.
    pub totals: TrialBalanceTotals,
}

/// Outcome of one period in [`TrialBalanceRepository::recalculate_many`].
#[derive(Debug)]
pub struct PeriodRecalculation {
    /// The period requested.
    pub period_id: Uuid,
    /// What the rebuild did, or why it was rolled back.
    pub result: Result<RecalculationOutcome, RepositoryError>,
}

/// Trial balance repository.
#[derive(Debug, Clone)]
pub struct TrialBalanceRepository {
    db: DatabaseConnection,
    locks: PeriodLocks,
    settings: LedgerSettings,
}

impl TrialBalanceRepository {
    /// Creates a new trial balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: PeriodLocks, settings: LedgerSettings) -> Self {
        Self { db, locks, settings }
    }

    /// Reads the stored rows of a period.
    ///
    /// Values are returned as stored; every write keeps them consistent.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist
    /// - Database errors
    pub async fn read(
        &self,
        period_id: Uuid,
        filter: TrialBalanceFilter,
    ) -> Result<TrialBalanceReport, RepositoryError> {
        if periods::Entity::find_by_id(period_id).one(&self.db).await?.is_none() {
            return Err(LedgerError::PeriodNotFound(period_id).into());
        }

        let mut query = trial_balance_rows::Entity::find()
            .find_also_related(accounts::Entity)
            .filter(trial_balance_rows::Column::PeriodId.eq(period_id))
            .order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(account_type)));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(accounts::Column::Code.contains(search))
                    .add(accounts::Column::Name.contains(search)),
            );
        }

        let lines: Vec<TrialBalanceLine> = query
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(row, account)| {
                let account = account?;
                Some(TrialBalanceLine {
                    account_id: account.id,
                    account_code: account.code,
                    account_name: account.name,
                    account_type: account.account_type.into(),
                    normal_balance: account.normal_balance.into(),
                    figures: row.figures(),
                })
            })
            .collect();

        let totals = TrialBalanceTotals::from_rows(
            lines.iter().map(|line| &line.figures),
            self.settings.balance_tolerance,
        );

        let (lines, meta) = match filter.page {
            Some(page) => {
                let meta = PageMeta::new(page, u64::try_from(lines.len()).unwrap_or(u64::MAX));
                let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
                let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
                (lines.into_iter().skip(offset).take(limit).collect(), Some(meta))
            }
            None => (lines, None),
        };

        Ok(TrialBalanceReport {
            period_id,
            lines,
            meta,
            totals,
        })
    }

    /// Reads a single row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_row(
        &self,
        period_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<trial_balance_rows::Model>, RepositoryError> {
        Ok(trial_balance_rows::Entity::find_by_id((period_id, account_id))
            .one(&self.db)
            .await?)
    }

    /// Rebuilds every row of a period from posted entries and posted opening
    /// balances, replacing what is stored.
    ///
    /// Holds the period's exclusive lock, so no posting into the period runs
    /// concurrently. Safe to repeat.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist
    /// - Database errors; nothing is committed in that case
    pub async fn recalculate(&self, period_id: Uuid) -> Result<RecalculationOutcome, RepositoryError> {
        let _guard = self.locks.exclusive(period_id).await;
        let txn = self.db.begin().await?;

        let period = periods::Entity::find_by_id(period_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::PeriodNotFound(period_id))?;

        let mut scan = scan_period(&txn, period_id).await?;
        let stored = trial_balance_rows::Entity::find()
            .filter(trial_balance_rows::Column::PeriodId.eq(period_id))
            .all(&txn)
            .await?;
        for row in &stored {
            scan.rebuild.include(row.account_id);
        }

        let affected: BTreeSet<Uuid> = scan.rebuild.account_ids().collect();
        let accounts = lock_accounts(&txn, affected.iter().copied()).await?;
        let prior = prior_movement(&txn, &self.settings.calendar, &period, &affected).await?;

        trial_balance_rows::Entity::delete_many()
            .filter(trial_balance_rows::Column::PeriodId.eq(period_id))
            .exec(&txn)
            .await?;

        let rows = scan.rebuild.finish(
            |id| accounts.get(&id).map(|a| a.normal_balance.into()),
            |id| prior.get(&id).copied().unwrap_or_default(),
        );
        let rows_rebuilt = rows.len();

        if !rows.is_empty() {
            let now = Utc::now().into();
            let models = rows
                .iter()
                .map(|(account_id, figures)| row_model(period_id, *account_id, figures, now));
            trial_balance_rows::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await?;
        }

        for account_id in &affected {
            if let Some(account) = accounts.get(account_id) {
                refresh_chain(
                    &txn,
                    &self.settings.calendar,
                    &period,
                    *account_id,
                    account.normal_balance.into(),
                )
                .await?;
            }
        }

        txn.commit().await?;

        let outcome = RecalculationOutcome {
            period_id,
            rows_rebuilt,
            entries_scanned: scan.entries_scanned,
            opening_balances_applied: scan.opening_balances_applied,
        };
        info!(
            period_id = %period_id,
            rows_rebuilt,
            entries_scanned = outcome.entries_scanned,
            opening_balances_applied = outcome.opening_balances_applied,
            "Trial balance recalculated"
        );
        Ok(outcome)
    }

    /// Rebuilds several periods, each in its own transaction, in
    /// chronological order. Duplicate ids are rebuilt once.
    ///
    /// Unknown ids are reported last with `PeriodNotFound`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the periods cannot be listed; per-period
    /// failures are reported in the result.
    pub async fn recalculate_many(
        &self,
        period_ids: &[Uuid],
    ) -> Result<Vec<PeriodRecalculation>, RepositoryError> {
        let requested: BTreeSet<Uuid> = period_ids.iter().copied().collect();
        let known = periods::Entity::find()
            .filter(periods::Column::Id.is_in(requested.iter().copied()))
            .order_by_asc(periods::Column::StartDate)
            .all(&self.db)
            .await?;

        let mut ordered: Vec<Uuid> = known.iter().map(|p| p.id).collect();
        ordered.extend(requested.iter().filter(|id| !known.iter().any(|p| p.id == **id)));

        let mut results = Vec::with_capacity(ordered.len());
        for period_id in ordered {
            let result = self.recalculate(period_id).await;
            if let Err(err) = &result {
                warn!(period_id = %period_id, error = %err, "Recalculation failed");
            }
            results.push(PeriodRecalculation { period_id, result });
        }
        Ok(results)
    }

    /// Compares stored rows with a rebuild done in memory. Writes nothing.
    ///
    /// Earlier periods' stored movement is trusted for the `ytd` columns.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist
    /// - Database errors
    pub async fn detect_drift(&self, period_id: Uuid) -> Result<Vec<AccountDrift>, RepositoryError> {
        let _guard = self.locks.exclusive(period_id).await;
        let txn = self.db.begin().await?;

        let period = periods::Entity::find_by_id(period_id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::PeriodNotFound(period_id))?;

        let mut scan = scan_period(&txn, period_id).await?;
        let stored: BTreeMap<Uuid, TrialBalanceFigures> = trial_balance_rows::Entity::find()
            .filter(trial_balance_rows::Column::PeriodId.eq(period_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| (row.account_id, row.figures()))
            .collect();
        for account_id in stored.keys() {
            scan.rebuild.include(*account_id);
        }

        let affected: BTreeSet<Uuid> = scan.rebuild.account_ids().collect();
        let accounts = accounts_by_id(affected.iter().copied())
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| (a.id, NormalBalance::from(a.normal_balance)))
            .collect::<HashMap<_, _>>();
        let prior = prior_movement(&txn, &self.settings.calendar, &period, &affected).await?;
        txn.commit().await?;

        let expected: BTreeMap<Uuid, TrialBalanceFigures> = scan
            .rebuild
            .finish(
                |id| accounts.get(&id).copied(),
                |id| prior.get(&id).copied().unwrap_or_default(),
            )
            .into_iter()
            .collect();

        let drift = detect_drift(&stored, &expected, self.settings.balance_tolerance);
        if drift.is_empty() {
            debug!(period_id = %period_id, "No trial balance drift");
        } else {
            warn!(period_id = %period_id, accounts = drift.len(), "Trial balance drift detected");
        }
        Ok(drift)
    }

    /// Counts the stored rows of a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_rows(&self, period_id: Uuid) -> Result<u64, RepositoryError> {
        Ok(trial_balance_rows::Entity::find()
            .filter(trial_balance_rows::Column::PeriodId.eq(period_id))
            .count(&self.db)
            .await?)
    }
}

struct PeriodScan {
    rebuild: PeriodRebuild,
    entries_scanned: usize,
    opening_balances_applied: usize,
}

/// Feeds every posted line and posted opening-balance detail of a period into
/// a fresh rebuild.
async fn scan_period<C: ConnectionTrait>(conn: &C, period_id: Uuid) -> Result<PeriodScan, RepositoryError> {
    let mut rebuild = PeriodRebuild::new();

    let entries_scanned = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::PeriodId.eq(period_id))
        .filter(ledger_entries::Column::Status.eq(EntryStatus::Posted))
        .count(conn)
        .await?;

    let lines = ledger_lines::Entity::find()
        .inner_join(ledger_entries::Entity)
        .filter(ledger_entries::Column::PeriodId.eq(period_id))
        .filter(ledger_entries::Column::Status.eq(EntryStatus::Posted))
        .all(conn)
        .await?;
    for line in &lines {
        rebuild.apply_movement(&AccountMovement {
            account_id: line.account_id,
            debit: line.debit_amount,
            credit: line.credit_amount,
        });
    }

    let posted: Vec<Uuid> = opening_balances::Entity::find()
        .filter(opening_balances::Column::PeriodId.eq(period_id))
        .filter(opening_balances::Column::Status.eq(OpeningBalanceStatus::Posted))
        .all(conn)
        .await?
        .into_iter()
        .map(|ob| ob.id)
        .collect();

    if !posted.is_empty() {
        let details = opening_balance_details::Entity::find()
            .filter(opening_balance_details::Column::OpeningBalanceId.is_in(posted.iter().copied()))
            .all(conn)
            .await?;
        for detail in &details {
            rebuild.apply_opening(detail.account_id, detail.debit, detail.credit);
        }
    }

    Ok(PeriodScan {
        rebuild,
        entries_scanned: usize::try_from(entries_scanned).unwrap_or(usize::MAX),
        opening_balances_applied: posted.len(),
    })
}

fn accounts_by_id(ids: impl IntoIterator<Item = Uuid>) -> Select<accounts::Entity> {
    accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .order_by_asc(accounts::Column::Id)
}

/// Locks account rows `FOR UPDATE` in ascending id order.
///
/// Every writer that touches trial-balance rows takes these locks first, so
/// two writers refreshing the same account's `ytd` chain serialize.
pub(crate) async fn lock_accounts<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<BTreeMap<Uuid, accounts::Model>, RepositoryError> {
    let ids: BTreeSet<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let models = accounts_by_id(ids).lock_exclusive().all(conn).await?;
    Ok(models.into_iter().map(|a| (a.id, a)).collect())
}

/// Applies movements to a period's rows and refreshes each account's chain.
///
/// The caller holds the period's shared lock, an open transaction and the
/// account locks from [`lock_accounts`].
pub(crate) async fn apply_movements<C: ConnectionTrait>(
    conn: &C,
    calendar: &FiscalCalendar,
    period: &periods::Model,
    bucket: Bucket,
    movements: &[AccountMovement],
    accounts: &BTreeMap<Uuid, accounts::Model>,
) -> Result<(), RepositoryError> {
    for movement in movements {
        let account = accounts
            .get(&movement.account_id)
            .ok_or(LedgerError::AccountNotFound(movement.account_id))?;

        upsert_increment(conn, period.id, bucket, movement).await?;
        let refreshed = refresh_chain(
            conn,
            calendar,
            period,
            movement.account_id,
            account.normal_balance.into(),
        )
        .await?;

        debug!(
            period_id = %period.id,
            account_id = %movement.account_id,
            bucket = ?bucket,
            debit = %movement.debit,
            credit = %movement.credit,
            rows_refreshed = refreshed,
            "Trial balance row updated"
        );
    }
    Ok(())
}

/// `INSERT … ON CONFLICT (period_id, account_id) DO UPDATE SET col = col + x`.
async fn upsert_increment<C: ConnectionTrait>(
    conn: &C,
    period_id: Uuid,
    bucket: Bucket,
    movement: &AccountMovement,
) -> Result<(), RepositoryError> {
    let amounts = Sides::new(movement.debit, movement.credit);
    let mut figures = TrialBalanceFigures::default();
    match bucket {
        Bucket::Opening => figures.opening = amounts,
        Bucket::Period => figures.period = amounts,
    }

    let (debit_col, credit_col) = bucket.columns();
    let row = row_model(period_id, movement.account_id, &figures, Utc::now().into());

    trial_balance_rows::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                trial_balance_rows::Column::PeriodId,
                trial_balance_rows::Column::AccountId,
            ])
            .value(
                debit_col,
                Expr::col((trial_balance_rows::Entity, debit_col)).add(movement.debit),
            )
            .value(
                credit_col,
                Expr::col((trial_balance_rows::Entity, credit_col)).add(movement.credit),
            )
            .update_column(trial_balance_rows::Column::CalculatedAt)
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Recomputes `ending` and `ytd` of one account for `period` and every later
/// period of its fiscal year. Rows that come out all zero are deleted, as a
/// rebuild would not produce them. Returns the number of rows rewritten.
async fn refresh_chain<C: ConnectionTrait>(
    conn: &C,
    calendar: &FiscalCalendar,
    period: &periods::Model,
    account_id: Uuid,
    normal_balance: NormalBalance,
) -> Result<usize, RepositoryError> {
    let fiscal_periods = fiscal_year_periods(conn, calendar, period).await?;
    let mut rows: HashMap<Uuid, trial_balance_rows::Model> = trial_balance_rows::Entity::find()
        .filter(trial_balance_rows::Column::AccountId.eq(account_id))
        .filter(trial_balance_rows::Column::PeriodId.is_in(fiscal_periods.iter().map(|p| p.id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.period_id, row))
        .collect();

    let chain: Vec<(NaiveDate, trial_balance_rows::Model)> = fiscal_periods
        .iter()
        .filter_map(|p| rows.remove(&p.id).map(|row| (p.start_date, row)))
        .collect();
    let movements: Vec<Sides> = chain.iter().map(|(_, row)| row.figures().period).collect();
    let ytd = ytd_chain(normal_balance, &movements);

    let mut refreshed = 0;
    for ((start_date, row), ytd) in chain.into_iter().zip(ytd) {
        if start_date < period.start_date {
            continue;
        }

        let stored = row.figures();
        let mut figures = stored;
        figures.recompute_ending(normal_balance);
        figures.ytd = ytd;
        if figures.is_zero() {
            trial_balance_rows::Entity::delete_by_id((row.period_id, row.account_id))
                .exec(conn)
                .await?;
            refreshed += 1;
        } else if figures != stored {
            let mut active: trial_balance_rows::ActiveModel = row.into();
            active.ending_debit = Set(figures.ending.debit);
            active.ending_credit = Set(figures.ending.credit);
            active.ytd_debit = Set(figures.ytd.debit);
            active.ytd_credit = Set(figures.ytd.credit);
            active.calculated_at = Set(Utc::now().into());
            active.update(conn).await?;
            refreshed += 1;
        }
    }
    Ok(refreshed)
}

/// Periods of the fiscal year containing `period`, by start date.
async fn fiscal_year_periods<C: ConnectionTrait>(
    conn: &C,
    calendar: &FiscalCalendar,
    period: &periods::Model,
) -> Result<Vec<periods::Model>, RepositoryError> {
    let Some((year_start, year_end)) = calendar.year_bounds_for(period.start_date) else {
        return Ok(vec![period.clone()]);
    };
    Ok(periods::Entity::find()
        .filter(periods::Column::StartDate.gte(year_start))
        .filter(periods::Column::StartDate.lte(year_end))
        .order_by_asc(periods::Column::StartDate)
        .all(conn)
        .await?)
}

/// Σ period movement per account over the fiscal-year periods before `period`.
async fn prior_movement<C: ConnectionTrait>(
    conn: &C,
    calendar: &FiscalCalendar,
    period: &periods::Model,
    accounts: &BTreeSet<Uuid>,
) -> Result<HashMap<Uuid, Sides>, RepositoryError> {
    let earlier: Vec<Uuid> = fiscal_year_periods(conn, calendar, period)
        .await?
        .into_iter()
        .filter(|p| p.start_date < period.start_date)
        .map(|p| p.id)
        .collect();
    if earlier.is_empty() || accounts.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = trial_balance_rows::Entity::find()
        .filter(trial_balance_rows::Column::PeriodId.is_in(earlier))
        .filter(trial_balance_rows::Column::AccountId.is_in(accounts.iter().copied()))
        .all(conn)
        .await?;

    let mut sums: HashMap<Uuid, Sides> = HashMap::new();
    for row in &rows {
        let sum = sums.entry(row.account_id).or_default();
        *sum = sum.plus(Sides::new(row.period_debit, row.period_credit));
    }
    Ok(sums)
}

fn row_model(
    period_id: Uuid,
    account_id: Uuid,
    figures: &TrialBalanceFigures,
    calculated_at: sea_orm::prelude::DateTimeWithTimeZone,
) -> trial_balance_rows::ActiveModel {
    trial_balance_rows::ActiveModel {
        period_id: Set(period_id),
        account_id: Set(account_id),
        opening_debit: Set(figures.opening.debit),
        opening_credit: Set(figures.opening.credit),
        period_debit: Set(figures.period.debit),
        period_credit: Set(figures.period.credit),
        ending_debit: Set(figures.ending.debit),
        ending_credit: Set(figures.ending.credit),
        ytd_debit: Set(figures.ytd.debit),
        ytd_credit: Set(figures.ytd.credit),
        calculated_at: Set(calculated_at),
    }
}
