//! Period repository for the accounting-period registry.

use chrono::{NaiveDate, Utc};
use neraca_core::period::{Period, validate_new_period};
use neraca_core::{LedgerError, LedgerSettings};
use neraca_shared::types::PeriodId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::periods;
use crate::error::RepositoryError;
use crate::locks::PeriodLocks;

/// Input for creating a period.
#[derive(Debug, Clone)]
pub struct CreatePeriodInput {
    /// Display name.
    pub name: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

/// Inclusive date range used to list periods.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range.
    pub to: NaiveDate,
}

/// Period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
    locks: PeriodLocks,
    settings: LedgerSettings,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: PeriodLocks, settings: LedgerSettings) -> Self {
        Self { db, locks, settings }
    }

    /// Creates a period.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` if `start_date > end_date`
    /// - `OverlappingPeriod` if the range overlaps an existing period
    pub async fn create(&self, input: CreatePeriodInput) -> Result<periods::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = load_domain_periods(&txn).await?;
        validate_new_period(input.start_date, input.end_date, &existing)?;

        let created = insert_period(&txn, input.name, input.start_date, input.end_date).await?;
        txn.commit().await?;

        info!(period_id = %created.id, name = %created.name, "Period created");
        Ok(created)
    }

    /// Creates every monthly period of one fiscal year.
    ///
    /// Nothing is created if any month overlaps an existing period.
    ///
    /// # Errors
    ///
    /// - `InvalidFiscalMonth` if the year cannot be represented
    /// - `OverlappingPeriod` naming the first clash
    pub async fn generate_year(&self, year: i32) -> Result<Vec<periods::Model>, RepositoryError> {
        let specs = self.settings.calendar.monthly_periods(year);
        if specs.is_empty() {
            return Err(LedgerError::InvalidFiscalMonth(self.settings.calendar.start_month()).into());
        }

        let txn = self.db.begin().await?;
        let mut existing = load_domain_periods(&txn).await?;
        let mut created = Vec::with_capacity(specs.len());

        for spec in specs {
            validate_new_period(spec.start_date, spec.end_date, &existing)?;
            let model = insert_period(&txn, spec.name, spec.start_date, spec.end_date).await?;
            existing.push(Period::from(&model));
            created.push(model);
        }

        txn.commit().await?;
        info!(fiscal_year = year, periods = created.len(), "Fiscal year generated");
        Ok(created)
    }

    /// Finds a period by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<periods::Model>, RepositoryError> {
        Ok(periods::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists periods by start date, optionally only those overlapping `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, range: Option<DateRange>) -> Result<Vec<periods::Model>, RepositoryError> {
        let mut query = periods::Entity::find().order_by_asc(periods::Column::StartDate);
        if let Some(range) = range {
            query = query
                .filter(periods::Column::StartDate.lte(range.to))
                .filter(periods::Column::EndDate.gte(range.from));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Finds the open period containing `date`.
    ///
    /// Returns `None` if no period contains the date or the one that does is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_open_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<periods::Model>, RepositoryError> {
        Ok(find_containing(&self.db, date)
            .await?
            .filter(|period| !period.is_closed))
    }

    /// Closes a period. Waits for in-flight postings to the period to finish.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the period does not exist.
    pub async fn close(&self, id: Uuid) -> Result<periods::Model, RepositoryError> {
        self.set_closed(id, true).await
    }

    /// Reopens a closed period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the period does not exist.
    pub async fn reopen(&self, id: Uuid) -> Result<periods::Model, RepositoryError> {
        self.set_closed(id, false).await
    }

    async fn set_closed(&self, id: Uuid, closed: bool) -> Result<periods::Model, RepositoryError> {
        let _guard = self.locks.exclusive(id).await;

        let period = self.find(id).await?.ok_or(LedgerError::PeriodNotFound(id))?;
        if period.is_closed == closed {
            return Ok(period);
        }

        let now = Utc::now().into();
        let mut active: periods::ActiveModel = period.into();
        active.is_closed = Set(closed);
        active.closed_at = Set(closed.then_some(now));
        active.updated_at = Set(now);
        let updated = active.update(&self.db).await?;

        info!(period_id = %id, is_closed = closed, "Period state changed");
        Ok(updated)
    }
}

/// Finds the period whose range contains `date`, open or closed.
pub(crate) async fn find_containing<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
) -> Result<Option<periods::Model>, RepositoryError> {
    Ok(periods::Entity::find()
        .filter(periods::Column::StartDate.lte(date))
        .filter(periods::Column::EndDate.gte(date))
        .one(conn)
        .await?)
}

async fn load_domain_periods<C: ConnectionTrait>(conn: &C) -> Result<Vec<Period>, RepositoryError> {
    let models = periods::Entity::find()
        .order_by_asc(periods::Column::StartDate)
        .all(conn)
        .await?;
    Ok(models.iter().map(Period::from).collect())
}

async fn insert_period<C: ConnectionTrait>(
    conn: &C,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<periods::Model, RepositoryError> {
    let now = Utc::now().into();
    let model = periods::ActiveModel {
        id: Set(PeriodId::new().into_inner()),
        name: Set(name),
        start_date: Set(start_date),
        end_date: Set(end_date),
        is_closed: Set(false),
        closed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(conn).await?)
}
