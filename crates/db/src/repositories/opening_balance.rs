//! Opening balance repository: draft, post and soft-delete lifecycle.

use std::collections::BTreeSet;

use chrono::Utc;
use neraca_core::ledger::AccountMovement;
use neraca_core::opening_balance::{self, OpeningBalanceInput, validate_details};
use neraca_core::period::{Period, resolve_open_period};
use neraca_core::{LedgerError, LedgerSettings};
use neraca_shared::types::OpeningBalanceId;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::period::find_containing;
use super::trial_balance::{Bucket, apply_movements, lock_accounts};
use crate::entities::{
    opening_balance_details, opening_balances, periods,
    sea_orm_active_enums::OpeningBalanceStatus,
};
use crate::error::RepositoryError;
use crate::locks::PeriodLocks;

/// An opening balance header with its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningBalanceRecord {
    /// Header.
    pub header: opening_balances::Model,
    /// Per-account amounts.
    pub details: Vec<opening_balance_details::Model>,
}

impl OpeningBalanceRecord {
    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> opening_balance::OpeningBalanceStatus {
        self.header.status.into()
    }
}

/// Opening balance repository.
#[derive(Debug, Clone)]
pub struct OpeningBalanceRepository {
    db: DatabaseConnection,
    locks: PeriodLocks,
    settings: LedgerSettings,
}

impl OpeningBalanceRepository {
    /// Creates a new opening balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: PeriodLocks, settings: LedgerSettings) -> Self {
        Self { db, locks, settings }
    }

    /// Creates a draft opening balance.
    ///
    /// Details that do not balance are accepted and logged.
    ///
    /// # Errors
    ///
    /// - `EmptyOpeningBalance`, `NegativeAmount`, `ZeroAmount`, `BothSides`,
    ///   `DuplicateOpeningAccount` for malformed details
    /// - `AccountNotFound` if a detail references an unknown account
    pub async fn create(&self, input: OpeningBalanceInput) -> Result<OpeningBalanceRecord, RepositoryError> {
        let txn = self.db.begin().await?;
        let details = validate(&txn, &input).await?;
        let now = Utc::now().into();
        let id = OpeningBalanceId::new().into_inner();
        let header = opening_balances::ActiveModel {
            id: Set(id),
            as_of_date: Set(input.as_of_date),
            description: Set(input.description),
            status: Set(OpeningBalanceStatus::Draft),
            period_id: Set(None),
            posted_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        let details = insert_details(&txn, id, &details).await?;
        txn.commit().await?;

        info!(opening_balance_id = %id, details = details.len(), "Opening balance created");
        Ok(OpeningBalanceRecord { header, details })
    }

    /// Replaces the date, description and details of a draft.
    ///
    /// # Errors
    ///
    /// - `OpeningBalanceNotFound` if missing or deleted
    /// - `AlreadyPosted` if it was posted
    /// - Detail validation errors as for [`Self::create`]
    pub async fn update(
        &self,
        id: Uuid,
        input: OpeningBalanceInput,
    ) -> Result<OpeningBalanceRecord, RepositoryError> {
        let txn = self.db.begin().await?;
        let header = opening_balances::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::OpeningBalanceNotFound(id))?;
        opening_balance::OpeningBalanceStatus::from(header.status).ensure_draft(id)?;
        let details = validate(&txn, &input).await?;

        opening_balance_details::Entity::delete_many()
            .filter(opening_balance_details::Column::OpeningBalanceId.eq(id))
            .exec(&txn)
            .await?;
        let details = insert_details(&txn, id, &details).await?;

        let mut active: opening_balances::ActiveModel = header.into();
        active.as_of_date = Set(input.as_of_date);
        active.description = Set(input.description);
        active.updated_at = Set(Utc::now().into());
        let header = active.update(&txn).await?;
        txn.commit().await?;

        info!(opening_balance_id = %id, details = details.len(), "Opening balance updated");
        Ok(OpeningBalanceRecord { header, details })
    }

    /// Posts a draft into the open period containing its date, seeding the
    /// opening columns of the trial balance. Applies exactly once.
    ///
    /// # Errors
    ///
    /// - `OpeningBalanceNotFound` if missing or deleted
    /// - `AlreadyPosted` if it was posted before
    /// - `NoOpenPeriod` if no period contains the date
    /// - `PeriodClosed` if the containing period is closed
    /// - Database errors; nothing is written in that case
    pub async fn post(&self, id: Uuid) -> Result<OpeningBalanceRecord, RepositoryError> {
        let result = self.try_post(id).await;
        if let Err(err) = &result {
            warn!(opening_balance_id = %id, error = %err, "Opening balance post rejected");
        }
        result
    }

    async fn try_post(&self, id: Uuid) -> Result<OpeningBalanceRecord, RepositoryError> {
        let header = opening_balances::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::OpeningBalanceNotFound(id))?;
        opening_balance::OpeningBalanceStatus::from(header.status).ensure_draft(id)?;
        let mut candidate = open_period_for(&self.db, &header).await?;

        loop {
            let _guard = self.locks.shared(candidate.id).await;
            let txn = self.db.begin().await?;

            // Owning the header blocks `update` until the details are applied.
            let header = opening_balances::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or(LedgerError::OpeningBalanceNotFound(id))?;
            opening_balance::OpeningBalanceStatus::from(header.status).ensure_draft(id)?;

            let period = find_containing(&txn, header.as_of_date)
                .await?
                .ok_or(LedgerError::NoOpenPeriod(header.as_of_date))?;
            if period.id != candidate.id {
                debug!(opening_balance_id = %id, "Opening balance date moved, retrying post");
                txn.rollback().await?;
                candidate = period;
                continue;
            }
            let period = periods::Entity::find_by_id(period.id)
                .lock_shared()
                .one(&txn)
                .await?
                .ok_or(LedgerError::NoOpenPeriod(header.as_of_date))?;
            resolve_open_period(header.as_of_date, &[Period::from(&period)])?;

            return self.post_locked(txn, id, &period).await;
        }
    }

    /// Applies a draft whose header row and period the transaction already holds.
    async fn post_locked(
        &self,
        txn: DatabaseTransaction,
        id: Uuid,
        period: &periods::Model,
    ) -> Result<OpeningBalanceRecord, RepositoryError> {
        let details = details_of(&txn, id).await?;
        let movements: Vec<AccountMovement> = details
            .iter()
            .map(|d| AccountMovement {
                account_id: d.account_id,
                debit: d.debit,
                credit: d.credit,
            })
            .collect();
        let accounts = lock_accounts(&txn, movements.iter().map(|m| m.account_id)).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let posted = opening_balances::Entity::update_many()
            .col_expr(opening_balances::Column::Status, Expr::value(OpeningBalanceStatus::Posted))
            .col_expr(opening_balances::Column::PeriodId, Expr::value(period.id))
            .col_expr(opening_balances::Column::PostedAt, Expr::value(now))
            .col_expr(opening_balances::Column::UpdatedAt, Expr::value(now))
            .filter(opening_balances::Column::Id.eq(id))
            .filter(opening_balances::Column::Status.eq(OpeningBalanceStatus::Draft))
            .exec(&txn)
            .await?;
        if posted.rows_affected != 1 {
            return Err(current_state_error(&txn, id).await);
        }

        apply_movements(
            &txn,
            &self.settings.calendar,
            period,
            Bucket::Opening,
            &movements,
            &accounts,
        )
        .await?;

        let header = opening_balances::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::OpeningBalanceNotFound(id))?;
        txn.commit().await?;

        info!(
            opening_balance_id = %id,
            period_id = %period.id,
            details = details.len(),
            "Opening balance posted"
        );
        Ok(OpeningBalanceRecord { header, details })
    }

    /// Soft-deletes a draft.
    ///
    /// # Errors
    ///
    /// - `OpeningBalanceNotFound` if missing or already deleted
    /// - `AlreadyPosted` if it was posted
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let deleted = opening_balances::Entity::update_many()
            .col_expr(opening_balances::Column::Status, Expr::value(OpeningBalanceStatus::Deleted))
            .col_expr(opening_balances::Column::DeletedAt, Expr::value(now))
            .col_expr(opening_balances::Column::UpdatedAt, Expr::value(now))
            .filter(opening_balances::Column::Id.eq(id))
            .filter(opening_balances::Column::Status.eq(OpeningBalanceStatus::Draft))
            .exec(&self.db)
            .await?;
        if deleted.rows_affected != 1 {
            return Err(current_state_error(&self.db, id).await);
        }

        info!(opening_balance_id = %id, "Opening balance deleted");
        Ok(())
    }

    /// Finds an opening balance with its details, whatever its state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<OpeningBalanceRecord>, RepositoryError> {
        let Some(header) = opening_balances::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let details = details_of(&self.db, id).await?;
        Ok(Some(OpeningBalanceRecord { header, details }))
    }

    /// Lists opening balance headers by date, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        include_deleted: bool,
    ) -> Result<Vec<opening_balances::Model>, RepositoryError> {
        let mut query = opening_balances::Entity::find()
            .order_by_desc(opening_balances::Column::AsOfDate)
            .order_by_desc(opening_balances::Column::CreatedAt);
        if !include_deleted {
            query = query.filter(opening_balances::Column::Status.ne(OpeningBalanceStatus::Deleted));
        }
        Ok(query.all(&self.db).await?)
    }
}

/// Validates details and locks the referenced accounts `FOR UPDATE`.
async fn validate<C: ConnectionTrait>(
    conn: &C,
    input: &OpeningBalanceInput,
) -> Result<Vec<opening_balance::OpeningBalanceDetailInput>, RepositoryError> {
    let (details, totals) = validate_details(&input.details)?;

    let ids: BTreeSet<Uuid> = details.iter().map(|d| d.account_id).collect();
    let known = lock_accounts(conn, ids.iter().copied()).await?;
    if let Some(missing) = ids.iter().find(|id| !known.contains_key(id)) {
        return Err(LedgerError::AccountNotFound(*missing).into());
    }

    if !totals.is_balanced() {
        warn!(
            as_of_date = %input.as_of_date,
            debit = %totals.debit,
            credit = %totals.credit,
            difference = %totals.difference(),
            "Opening balance does not balance"
        );
    }
    Ok(details)
}

/// The open period that receives an opening balance dated `header.as_of_date`.
async fn open_period_for<C: ConnectionTrait>(
    conn: &C,
    header: &opening_balances::Model,
) -> Result<periods::Model, RepositoryError> {
    let period = find_containing(conn, header.as_of_date)
        .await?
        .ok_or(LedgerError::NoOpenPeriod(header.as_of_date))?;
    resolve_open_period(header.as_of_date, &[Period::from(&period)])?;
    Ok(period)
}

/// Explains why a conditional draft transition matched no row.
async fn current_state_error<C: ConnectionTrait>(conn: &C, id: Uuid) -> RepositoryError {
    match opening_balances::Entity::find_by_id(id).one(conn).await {
        Ok(Some(header)) => match opening_balance::OpeningBalanceStatus::from(header.status).ensure_draft(id) {
            Err(err) => err.into(),
            Ok(()) => LedgerError::AlreadyPosted(id).into(),
        },
        Ok(None) => LedgerError::OpeningBalanceNotFound(id).into(),
        Err(err) => err.into(),
    }
}

async fn details_of<C: ConnectionTrait>(
    conn: &C,
    opening_balance_id: Uuid,
) -> Result<Vec<opening_balance_details::Model>, RepositoryError> {
    Ok(opening_balance_details::Entity::find()
        .filter(opening_balance_details::Column::OpeningBalanceId.eq(opening_balance_id))
        .order_by_asc(opening_balance_details::Column::Id)
        .all(conn)
        .await?)
}

async fn insert_details<C: ConnectionTrait>(
    conn: &C,
    opening_balance_id: Uuid,
    details: &[opening_balance::OpeningBalanceDetailInput],
) -> Result<Vec<opening_balance_details::Model>, RepositoryError> {
    let mut stored = Vec::with_capacity(details.len());
    for detail in details {
        let model = opening_balance_details::ActiveModel {
            id: Set(Uuid::now_v7()),
            opening_balance_id: Set(opening_balance_id),
            account_id: Set(detail.account_id),
            debit: Set(detail.debit),
            credit: Set(detail.credit),
        }
        .insert(conn)
        .await?;
        stored.push(model);
    }
    Ok(stored)
}
