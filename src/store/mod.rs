//! Storage backend selection
//!
//! Expenses and budgets live either in a local SQLite file or behind the
//! HTTP API of a `household-budget server`. The variant is picked once at
//! startup from [`Config`]; callers only ever see [`Store`].

pub mod remote;

use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Backend, Config};
use crate::database::db::{connection, migrate, queries};
use crate::database::models::{
    parse_month, Budget, Distribution, Expense, ExpenseStatus, NewExpense, SetBudget,
};
use crate::split::{AllocationSet, SplitError, MAX_AMOUNT};

pub use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("expense {0} not found")]
    NotFound(i64),

    #[error("invalid distribution: {0}")]
    InvalidDistribution(#[from] SplitError),

    #[error("invalid month key: {0}")]
    InvalidMonth(String),

    #[error("invalid expense: {0}")]
    InvalidExpense(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub enum Store {
    Local(Pool<Sqlite>),
    Remote(RemoteStore),
}

impl Store {
    pub async fn from_config(config: &Config) -> StoreResult<Self> {
        match config.backend {
            Backend::Local => Self::local(&config.database_url).await,
            Backend::Remote => Self::remote(&config.api_base_url),
        }
    }

    pub async fn local(db_url: &str) -> StoreResult<Self> {
        let pool = connection::get_db_pool(db_url).await?;
        migrate::run_migrations(&pool).await?;
        info!(db_url, "using local store");
        Ok(Self::Local(pool))
    }

    /// Migrated in-memory database, used by tests and demos.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = connection::get_memory_pool().await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::Local(pool))
    }

    pub fn remote(base_url: &str) -> StoreResult<Self> {
        info!(base_url, "using remote store");
        Ok(Self::Remote(RemoteStore::new(base_url)?))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }

    // ============= Expenses =============

    pub async fn list_expenses(&self, month: &str) -> StoreResult<Vec<Expense>> {
        check_month(month)?;
        match self {
            Self::Local(pool) => Ok(queries::list_expenses_by_month(pool, month).await?),
            Self::Remote(remote) => remote.list_expenses(month).await,
        }
    }

    pub async fn list_expenses_for_year(&self, year: i32) -> StoreResult<Vec<Expense>> {
        match self {
            Self::Local(pool) => Ok(queries::list_expenses_by_year(pool, year).await?),
            Self::Remote(remote) => remote.list_expenses_for_year(year).await,
        }
    }

    pub async fn get_expense(&self, expense_id: i64) -> StoreResult<Expense> {
        match self {
            Self::Local(pool) => queries::get_expense_by_id(pool, expense_id)
                .await?
                .ok_or(StoreError::NotFound(expense_id)),
            Self::Remote(remote) => remote.get_expense(expense_id).await,
        }
    }

    pub async fn create_expense(&self, new: &NewExpense) -> StoreResult<Expense> {
        check_new_expense(new)?;
        match self {
            Self::Local(pool) => {
                let expense_id = queries::create_expense(pool, new).await?;
                debug!(expense_id, "expense created");
                queries::get_expense_by_id(pool, expense_id)
                    .await?
                    .ok_or(StoreError::NotFound(expense_id))
            }
            Self::Remote(remote) => remote.create_expense(new).await,
        }
    }

    pub async fn delete_expense(&self, expense_id: i64) -> StoreResult<()> {
        match self {
            Self::Local(pool) => found(queries::delete_expense(pool, expense_id).await?, expense_id),
            Self::Remote(remote) => remote.delete_expense(expense_id).await,
        }
    }

    pub async fn set_status(
        &self,
        expense_id: i64,
        status: ExpenseStatus,
        note: Option<&str>,
    ) -> StoreResult<()> {
        match self {
            Self::Local(pool) => {
                found(queries::set_expense_status(pool, expense_id, status, note).await?, expense_id)
            }
            Self::Remote(remote) => remote.set_status(expense_id, status, note).await,
        }
    }

    /// Validates and stores the split of an expense. Nothing is written when
    /// the set does not pass [`AllocationSet::validate`] or does not fit the
    /// stored expense.
    pub async fn save_distribution(&self, expense_id: i64, set: &AllocationSet) -> StoreResult<()> {
        set.validate()?;
        let distribution = Distribution::from(set);
        match self {
            Self::Local(pool) => {
                let expense = queries::get_expense_by_id(pool, expense_id)
                    .await?
                    .ok_or(StoreError::NotFound(expense_id))?;
                check_distribution(&expense, &distribution)?;
                found(
                    queries::update_distribution(pool, expense_id, &distribution).await?,
                    expense_id,
                )
            }
            Self::Remote(remote) => remote.put_distribution(expense_id, &distribution).await,
        }
    }

    // ============= Budgets =============

    pub async fn list_budgets(&self, month: &str) -> StoreResult<Vec<Budget>> {
        check_month(month)?;
        match self {
            Self::Local(pool) => Ok(queries::list_budgets_by_month(pool, month).await?),
            Self::Remote(remote) => remote.list_budgets(month).await,
        }
    }

    pub async fn set_budget(&self, req: &SetBudget) -> StoreResult<Budget> {
        check_budget(req)?;
        match self {
            Self::Local(pool) => Ok(queries::upsert_budget(pool, req).await?),
            Self::Remote(remote) => remote.put_budget(req).await,
        }
    }
}

/// Checks shared by the local store and the HTTP handlers.
pub fn check_new_expense(new: &NewExpense) -> StoreResult<()> {
    if new.description.trim().is_empty() {
        return Err(StoreError::InvalidExpense("description is required".into()));
    }
    check_amount(new.amount)?;
    if let Some(distribution) = &new.distribution {
        if !new.expense_type.is_split() {
            return Err(StoreError::InvalidExpense("personal expenses are not split".into()));
        }
        distribution.validate_against(new.amount)?;
    }
    Ok(())
}

pub fn check_budget(req: &SetBudget) -> StoreResult<()> {
    check_month(&req.month)?;
    check_amount(req.amount)
}

/// Money values are non-negative, have at most two decimals and stay
/// below [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> StoreResult<()> {
    if amount < Decimal::ZERO {
        return Err(StoreError::InvalidExpense(format!("negative amount {amount}")));
    }
    if amount > MAX_AMOUNT {
        return Err(StoreError::InvalidExpense(format!("amount {amount} is too large")));
    }
    if amount.normalize().scale() > 2 {
        return Err(StoreError::InvalidExpense(format!(
            "amount {amount} has more than two decimals"
        )));
    }
    Ok(())
}

/// A distribution only belongs to a split expense and must match its amount.
pub fn check_distribution(expense: &Expense, distribution: &Distribution) -> StoreResult<()> {
    if !expense.expense_type.is_split() {
        return Err(StoreError::InvalidExpense("personal expenses are not split".into()));
    }
    distribution.validate_against(expense.amount)?;
    Ok(())
}

pub fn check_month(month: &str) -> StoreResult<()> {
    parse_month(month)
        .map(|_| ())
        .ok_or_else(|| StoreError::InvalidMonth(month.to_string()))
}

fn found(affected: bool, expense_id: i64) -> StoreResult<()> {
    if affected {
        Ok(())
    } else {
        Err(StoreError::NotFound(expense_id))
    }
}
