// HTTP client for the backend API (see backend::routes)
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{StoreError, StoreResult};
use crate::database::models::{
    Budget, Distribution, Expense, ExpenseStatus, NewExpense, SetBudget, StatusUpdate,
};

#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> StoreResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ============= Expenses =============

    pub async fn list_expenses(&self, month: &str) -> StoreResult<Vec<Expense>> {
        let resp = self
            .client
            .get(self.url("/api/expenses"))
            .query(&[("month", month)])
            .send()
            .await?;
        Ok(check(resp, None).await?.json().await?)
    }

    pub async fn list_expenses_for_year(&self, year: i32) -> StoreResult<Vec<Expense>> {
        let resp = self
            .client
            .get(self.url("/api/expenses"))
            .query(&[("year", year)])
            .send()
            .await?;
        Ok(check(resp, None).await?.json().await?)
    }

    pub async fn get_expense(&self, expense_id: i64) -> StoreResult<Expense> {
        let resp = self
            .client
            .get(self.url(&format!("/api/expenses/{expense_id}")))
            .send()
            .await?;
        Ok(check(resp, Some(expense_id)).await?.json().await?)
    }

    pub async fn create_expense(&self, new: &NewExpense) -> StoreResult<Expense> {
        let resp = self.client.post(self.url("/api/expenses")).json(new).send().await?;
        let expense: Expense = check(resp, None).await?.json().await?;
        debug!(expense_id = expense.id, "expense created remotely");
        Ok(expense)
    }

    pub async fn delete_expense(&self, expense_id: i64) -> StoreResult<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/expenses/{expense_id}")))
            .send()
            .await?;
        check(resp, Some(expense_id)).await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        expense_id: i64,
        status: ExpenseStatus,
        note: Option<&str>,
    ) -> StoreResult<()> {
        let body = StatusUpdate {
            status,
            note: note.map(str::to_string),
        };
        let resp = self
            .client
            .put(self.url(&format!("/api/expenses/{expense_id}/status")))
            .json(&body)
            .send()
            .await?;
        check(resp, Some(expense_id)).await?;
        Ok(())
    }

    pub async fn put_distribution(&self, expense_id: i64, distribution: &Distribution) -> StoreResult<()> {
        let resp = self
            .client
            .put(self.url(&format!("/api/expenses/{expense_id}/distribution")))
            .json(distribution)
            .send()
            .await?;
        check(resp, Some(expense_id)).await?;
        Ok(())
    }

    // ============= Budgets =============

    pub async fn list_budgets(&self, month: &str) -> StoreResult<Vec<Budget>> {
        let resp = self
            .client
            .get(self.url("/api/budgets"))
            .query(&[("month", month)])
            .send()
            .await?;
        Ok(check(resp, None).await?.json().await?)
    }

    pub async fn put_budget(&self, req: &SetBudget) -> StoreResult<Budget> {
        let resp = self.client.put(self.url("/api/budgets")).json(req).send().await?;
        Ok(check(resp, None).await?.json().await?)
    }
}

/// Turns non-2xx responses into errors; the API answers with `{"error": "..."}`.
async fn check(resp: Response, expense_id: Option<i64>) -> StoreResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, expense_id) {
        return Err(StoreError::NotFound(id));
    }

    let message = match resp.json::<ApiErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    warn!(status = status.as_u16(), %message, "api request failed");
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}
