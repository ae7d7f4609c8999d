//! Account repository for chart of accounts operations.

use chrono::Utc;
use neraca_core::LedgerError;
use neraca_core::account::{self, validate_account_code};
use neraca_shared::types::AccountId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    accounts, ledger_lines, opening_balance_details,
    sea_orm_active_enums::{AccountType, NormalBalance},
};
use crate::error::RepositoryError;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: account::AccountType,
    /// Balance direction; defaults from the account type.
    pub normal_balance: Option<account::NormalBalance>,
}

/// Input for updating an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// New classification.
    pub account_type: Option<account::AccountType>,
    /// New balance direction.
    pub normal_balance: Option<account::NormalBalance>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<account::AccountType>,
    /// Case-sensitive substring match on code or name.
    pub search: Option<String>,
    /// Only active accounts.
    pub active_only: bool,
}

/// Account repository for the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `InvalidAccountCode` if the code is malformed
    /// - `DuplicateAccountCode` if the code exists
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, RepositoryError> {
        validate_account_code(&input.code)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(LedgerError::DuplicateAccountCode(input.code).into());
        }

        let normal_balance = input
            .normal_balance
            .unwrap_or_else(|| input.account_type.default_normal_balance());
        let now = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            account_type: Set(AccountType::from(input.account_type)),
            normal_balance: Set(NormalBalance::from(normal_balance)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&self.db).await.map_err(|e| {
            let err = RepositoryError::from(e);
            if err.is_unique_violation() {
                LedgerError::DuplicateAccountCode(input.code.clone()).into()
            } else {
                err
            }
        })?;

        info!(account_id = %created.id, code = %created.code, "Account created");
        Ok(created)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> Result<Option<accounts::Model>, RepositoryError> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<accounts::Model>, RepositoryError> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?)
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: AccountFilter) -> Result<Vec<accounts::Model>, RepositoryError> {
        let mut query = accounts::Entity::find().order_by_asc(accounts::Column::Code);

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
        if filter.active_only {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Updates an account that no ledger data references.
    ///
    /// The account row is locked before the reference check, so a posting
    /// that locks the same account either finishes first and is seen, or
    /// waits for the update.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `AccountInUse` if any ledger line or opening-balance detail references it
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let account = lock_unreferenced(&txn, id).await?;

        let mut active: accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.into());
            if input.normal_balance.is_none() {
                active.normal_balance = Set(account_type.default_normal_balance().into());
            }
        }
        if let Some(normal_balance) = input.normal_balance {
            active.normal_balance = Set(normal_balance.into());
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let account = active.update(&txn).await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Deletes an account that no ledger data references.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `AccountInUse` if any ledger line or opening-balance detail references it
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        lock_unreferenced(&txn, id).await?;
        accounts::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Returns true if any ledger line or opening-balance detail references the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, RepositoryError> {
        is_referenced(&self.db, id).await
    }
}

/// Locks the account row `FOR UPDATE` and checks nothing references it.
async fn lock_unreferenced<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<accounts::Model, RepositoryError> {
    let account = accounts::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound(id))?;
    if is_referenced(conn, id).await? {
        return Err(LedgerError::AccountInUse(id).into());
    }
    Ok(account)
}

async fn is_referenced<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, RepositoryError> {
    let lines = ledger_lines::Entity::find()
        .filter(ledger_lines::Column::AccountId.eq(id))
        .count(conn)
        .await?;
    if lines > 0 {
        return Ok(true);
    }
    let details = opening_balance_details::Entity::find()
        .filter(opening_balance_details::Column::AccountId.eq(id))
        .count(conn)
        .await?;
    Ok(details > 0)
}
