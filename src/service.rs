//! Application service: the one place that talks to the [`Store`] and keeps
//! the per-month expense cache consistent with it.

use tracing::{debug, info};

use crate::cache::MonthCache;
use crate::database::models::{
    month_key, Budget, Expense, ExpenseStatus, NewExpense, SetBudget,
};
use crate::split::{AllocationSet, LimitPolicy, SplitResult};
use crate::store::{Store, StoreResult};
use crate::summary::{self, MonthlySummary, YearlySummary};

#[derive(Debug)]
pub struct ExpenseService {
    store: Store,
    cache: MonthCache<Vec<Expense>>,
    limit: LimitPolicy,
}

impl ExpenseService {
    pub fn new(store: Store, limit: LimitPolicy) -> Self {
        Self {
            store,
            cache: MonthCache::new(),
            limit,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn cached_months(&self) -> usize {
        self.cache.len()
    }

    pub async fn expenses_for_month(&mut self, month: &str) -> StoreResult<Vec<Expense>> {
        if let Some(hit) = self.cache.get(month) {
            debug!(month, "expense cache hit");
            return Ok(hit.clone());
        }
        let expenses = self.store.list_expenses(month).await?;
        self.cache.insert(month, expenses.clone());
        Ok(expenses)
    }

    pub async fn add_expense(&mut self, new: &NewExpense) -> StoreResult<Expense> {
        let expense = self.store.create_expense(new).await?;
        self.invalidate(&expense);
        info!(expense_id = expense.id, amount = %expense.amount, "expense added");
        Ok(expense)
    }

    pub async fn delete_expense(&mut self, expense: &Expense) -> StoreResult<()> {
        self.store.delete_expense(expense.id).await?;
        self.invalidate(expense);
        Ok(())
    }

    pub async fn set_status(
        &mut self,
        expense: &Expense,
        status: ExpenseStatus,
        note: Option<&str>,
    ) -> StoreResult<()> {
        self.store.set_status(expense.id, status, note).await?;
        self.invalidate(expense);
        Ok(())
    }

    /// The split to edit for an expense: its stored distribution, or the
    /// default split for its type when nothing was stored yet.
    pub fn open_distribution(&self, expense: &Expense) -> SplitResult<AllocationSet> {
        let policy = expense.expense_type.split_policy(self.limit);
        match &expense.distribution {
            Some(distribution) => distribution.to_allocation(expense.amount, policy),
            None => AllocationSet::default_split(expense.amount, policy),
        }
    }

    pub async fn save_distribution(&mut self, expense: &Expense, set: &AllocationSet) -> StoreResult<()> {
        self.store.save_distribution(expense.id, set).await?;
        self.invalidate(expense);
        Ok(())
    }

    pub async fn budgets_for_month(&self, month: &str) -> StoreResult<Vec<Budget>> {
        self.store.list_budgets(month).await
    }

    pub async fn set_budget(&self, req: &SetBudget) -> StoreResult<Budget> {
        self.store.set_budget(req).await
    }

    pub async fn monthly_summary(&mut self, month: &str) -> StoreResult<MonthlySummary> {
        let expenses = self.expenses_for_month(month).await?;
        let budgets = self.store.list_budgets(month).await?;
        Ok(summary::monthly_summary(month, &expenses, &budgets))
    }

    pub async fn yearly_summary(&self, year: i32) -> StoreResult<YearlySummary> {
        let expenses = self.store.list_expenses_for_year(year).await?;
        Ok(summary::yearly_summary(year, &expenses))
    }

    /// Forget everything cached (e.g. after another client changed data).
    pub fn refresh(&mut self) {
        self.cache.clear_all();
    }

    fn invalidate(&mut self, expense: &Expense) {
        let month = month_key(expense.spent_on);
        if self.cache.clear_cache_for_month(&month) {
            debug!(%month, "expense cache invalidated");
        }
    }
}
