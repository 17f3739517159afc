use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::database::models::{
    Budget, Distribution, Expense, ExpenseStatus, ExpenseType, NewExpense, SetBudget,
};
/*
This file contains the SQL for the local store:
CRUD logic for expenses (including their split distribution) and monthly budgets.
Decimals are stored as TEXT, the distribution as JSON TEXT.
 */

 /*==========Expense Queries=========== */

const EXPENSE_COLUMNS: &str = r#"
    expense_id,
    description,
    category,
    amount,
    expense_type,
    spent_on,
    paid_by,
    status,
    clarification_note,
    distribution,
    expense_created_at
"#;

// Create expense, returns the new id
pub async fn create_expense(pool: &Pool<Sqlite>, new: &NewExpense) -> Result<i64, sqlx::Error> {
    let distribution = encode_distribution(new.distribution.as_ref())?;

    let expense_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO expenses (
            description, category, amount, expense_type,
            spent_on, paid_by, distribution, expense_created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'))
        RETURNING expense_id
        "#,
    )
    .bind(&new.description)
    .bind(&new.category)
    .bind(new.amount.to_string())
    .bind(new.expense_type.as_str())
    .bind(new.spent_on)
    .bind(new.paid_by.as_deref())
    .bind(distribution)
    .fetch_one(pool)
    .await?;

    Ok(expense_id)
}

// Get expense by id
pub async fn get_expense_by_id(pool: &Pool<Sqlite>, expense_id: i64) -> Result<Option<Expense>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE expense_id = ?"))
        .bind(expense_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(expense_from_row).transpose()
}

// All expenses of one month ('YYYY-MM'), newest first
pub async fn list_expenses_by_month(pool: &Pool<Sqlite>, month: &str) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE substr(spent_on, 1, 7) = ?
         ORDER BY spent_on DESC, expense_id DESC"
    ))
    .bind(month)
    .fetch_all(pool)
    .await?
    .iter()
    .map(expense_from_row)
    .collect()
}

// All expenses of one year, oldest first
pub async fn list_expenses_by_year(pool: &Pool<Sqlite>, year: i32) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses
         WHERE substr(spent_on, 1, 4) = ?
         ORDER BY spent_on ASC, expense_id ASC"
    ))
    .bind(format!("{year:04}"))
    .fetch_all(pool)
    .await?
    .iter()
    .map(expense_from_row)
    .collect()
}

// Replace the split of an expense. The caller validates the distribution first.
pub async fn update_distribution(
    pool: &Pool<Sqlite>,
    expense_id: i64,
    distribution: &Distribution,
) -> Result<bool, sqlx::Error> {
    let json = encode_distribution(Some(distribution))?;

    let result = sqlx::query(
        r#"
        UPDATE expenses
        SET distribution = ?
        WHERE expense_id = ?
        "#,
    )
    .bind(json)
    .bind(expense_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Confirm an expense or flag it for clarification. Confirming drops the note.
pub async fn set_expense_status(
    pool: &Pool<Sqlite>,
    expense_id: i64,
    status: ExpenseStatus,
    note: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let note = match status {
        ExpenseStatus::Confirmed => None,
        ExpenseStatus::NeedsClarification => note,
    };

    let result = sqlx::query(
        r#"
        UPDATE expenses
        SET status = ?, clarification_note = ?
        WHERE expense_id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(note)
    .bind(expense_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Delete expense
pub async fn delete_expense(pool: &Pool<Sqlite>, expense_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE expense_id = ?")
        .bind(expense_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

 /*==========Budget Queries=========== */

// Create or replace the budget of one scope in one month
pub async fn upsert_budget(pool: &Pool<Sqlite>, req: &SetBudget) -> Result<Budget, sqlx::Error> {
    let budget_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO budgets (month, scope, amount)
        VALUES (?, ?, ?)
        ON CONFLICT (month, scope) DO UPDATE SET amount = excluded.amount
        RETURNING budget_id
        "#,
    )
    .bind(&req.month)
    .bind(req.scope.as_str())
    .bind(req.amount.to_string())
    .fetch_one(pool)
    .await?;

    Ok(Budget {
        id: budget_id,
        month: req.month.clone(),
        scope: req.scope,
        amount: req.amount,
    })
}

pub async fn list_budgets_by_month(pool: &Pool<Sqlite>, month: &str) -> Result<Vec<Budget>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT budget_id, month, scope, amount
        FROM budgets
        WHERE month = ?
        ORDER BY budget_id ASC
        "#,
    )
    .bind(month)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| {
        let scope_text: String = row.try_get("scope")?;
        let amount_text: String = row.try_get("amount")?;

        Ok(Budget {
            id: row.try_get("budget_id")?,
            month: row.try_get("month")?,
            scope: ExpenseType::from_str(&scope_text).map_err(|e| sqlx::Error::Decode(e.into()))?,
            amount: parse_decimal("amount", &amount_text)?,
        })
    })
    .collect::<Result<Vec<Budget>, sqlx::Error>>()
}

/* ========== helpers ========== */

fn expense_from_row(row: &SqliteRow) -> Result<Expense, sqlx::Error> {
    let amount_text: String = row.try_get("amount")?;
    let type_text: String = row.try_get("expense_type")?;
    let status_text: String = row.try_get("status")?;
    let distribution_json: Option<String> = row.try_get("distribution")?;

    let distribution = distribution_json
        .map(|json| serde_json::from_str::<Distribution>(&json))
        .transpose()
        .map_err(|e| sqlx::Error::Decode(format!("Invalid distribution JSON: {}", e).into()))?;

    Ok(Expense {
        id: row.try_get("expense_id")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        amount: parse_decimal("amount", &amount_text)?,
        expense_type: ExpenseType::from_str(&type_text).map_err(|e| sqlx::Error::Decode(e.into()))?,
        spent_on: row.try_get("spent_on")?,
        paid_by: row.try_get("paid_by")?,
        status: ExpenseStatus::from_str(&status_text).map_err(|e| sqlx::Error::Decode(e.into()))?,
        clarification_note: row.try_get("clarification_note")?,
        distribution,
        created_at: row.try_get("expense_created_at")?,
    })
}

fn parse_decimal(column: &str, text: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str(text)
        .map_err(|e| sqlx::Error::Decode(format!("Invalid Decimal format for {}: {}", column, e).into()))
}

fn encode_distribution(distribution: Option<&Distribution>) -> Result<Option<String>, sqlx::Error> {
    distribution
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| sqlx::Error::Protocol(format!("Invalid distribution JSON: {}", e)))
}
