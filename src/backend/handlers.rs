// src/backend/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{
    Budget, Distribution, Expense, NewExpense, SetBudget, StatusUpdate,
};
use crate::split::SplitError;
use crate::store::{check_budget, check_distribution, check_month, check_new_expense, StoreError};
use crate::summary::{self, MonthlySummary, YearlySummary};

// Every failure leaves the API as {"error": "..."}
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Internal(m) => {
                error!(%m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<SplitError> for ApiError {
    fn from(e: SplitError) -> Self {
        ApiError::Unprocessable(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::InvalidDistribution(_) => ApiError::Unprocessable(e.to_string()),
            StoreError::InvalidMonth(_) | StoreError::InvalidExpense(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub month: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

async fn load_expense(state: &AppState, expense_id: i64) -> ApiResult<Expense> {
    queries::get_expense_by_id(&state.db, expense_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("expense {expense_id} not found")))
}

fn affected(ok: bool, expense_id: i64) -> ApiResult<StatusCode> {
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("expense {expense_id} not found")))
    }
}

/*==========Expenses=========== */

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(q): Query<ExpenseQuery>,
) -> ApiResult<Json<Vec<Expense>>> {
    let expenses = match (q.month, q.year) {
        (Some(month), _) => {
            check_month(&month)?;
            queries::list_expenses_by_month(&state.db, &month).await?
        }
        (None, Some(year)) => queries::list_expenses_by_year(&state.db, year).await?,
        (None, None) => {
            return Err(ApiError::BadRequest("either month or year is required".into()))
        }
    };
    Ok(Json(expenses))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
) -> ApiResult<Json<Expense>> {
    Ok(Json(load_expense(&state, expense_id).await?))
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<NewExpense>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    check_new_expense(&payload)?;
    let expense_id = queries::create_expense(&state.db, &payload).await?;
    let expense = load_expense(&state, expense_id).await?;
    info!(expense_id, amount = %expense.amount, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
) -> ApiResult<StatusCode> {
    affected(queries::delete_expense(&state.db, expense_id).await?, expense_id)
}

// The stored split must add up against the expense it belongs to.
pub async fn put_distribution(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
    Json(distribution): Json<Distribution>,
) -> ApiResult<StatusCode> {
    let expense = load_expense(&state, expense_id).await?;
    if let Err(e) = check_distribution(&expense, &distribution) {
        warn!(expense_id, error = %e, "distribution rejected");
        return Err(e.into());
    }
    affected(
        queries::update_distribution(&state.db, expense_id, &distribution).await?,
        expense_id,
    )
}

pub async fn put_status(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<StatusCode> {
    let ok = queries::set_expense_status(&state.db, expense_id, update.status, update.note.as_deref())
        .await?;
    affected(ok, expense_id)
}

/*==========Budgets=========== */

pub async fn list_budgets(
    State(state): State<AppState>,
    Query(q): Query<MonthQuery>,
) -> ApiResult<Json<Vec<Budget>>> {
    check_month(&q.month)?;
    Ok(Json(queries::list_budgets_by_month(&state.db, &q.month).await?))
}

pub async fn put_budget(
    State(state): State<AppState>,
    Json(req): Json<SetBudget>,
) -> ApiResult<Json<Budget>> {
    check_budget(&req)?;
    Ok(Json(queries::upsert_budget(&state.db, &req).await?))
}

/*==========Summaries=========== */

pub async fn month_summary(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> ApiResult<Json<MonthlySummary>> {
    check_month(&month)?;
    let expenses = queries::list_expenses_by_month(&state.db, &month).await?;
    let budgets = queries::list_budgets_by_month(&state.db, &month).await?;
    Ok(Json(summary::monthly_summary(&month, &expenses, &budgets)))
}

pub async fn year_summary(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<Json<YearlySummary>> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(ApiError::BadRequest(format!("invalid year {year}")));
    }
    let expenses = queries::list_expenses_by_year(&state.db, year).await?;
    Ok(Json(summary::yearly_summary(year, &expenses)))
}
