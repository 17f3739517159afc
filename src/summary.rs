//! Monthly and yearly summaries, computed from already loaded expenses.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::{Budget, Expense, ExpenseStatus, ExpenseType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSummary {
    pub scope: ExpenseType,
    pub spent: Decimal,
    pub budget: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub over_budget: bool,
}

/// What one person paid against what their shares add up to.
/// A positive balance means the others owe them money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBalance {
    pub name: String,
    pub paid: Decimal,
    pub share: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub scopes: Vec<ScopeSummary>,
    pub total_spent: Decimal,
    pub needs_clarification: usize,
    pub balances: Vec<PersonBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: String,
    pub personal: Decimal,
    pub shared: Decimal,
    pub child: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub months: Vec<MonthRow>,
    pub total: Decimal,
}

pub fn monthly_summary(month: &str, expenses: &[Expense], budgets: &[Budget]) -> MonthlySummary {
    let scopes = ExpenseType::ALL
        .into_iter()
        .map(|scope| {
            let spent: Decimal = expenses
                .iter()
                .filter(|e| e.expense_type == scope)
                .map(|e| e.amount)
                .sum();
            let budget = budgets
                .iter()
                .find(|b| b.month == month && b.scope == scope)
                .map(|b| b.amount);
            ScopeSummary {
                scope,
                spent,
                budget,
                remaining: budget.map(|b| b - spent),
                over_budget: budget.map_or(false, |b| spent > b),
            }
        })
        .collect::<Vec<_>>();

    MonthlySummary {
        month: month.to_string(),
        total_spent: scopes.iter().map(|s| s.spent).sum(),
        scopes,
        needs_clarification: expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::NeedsClarification)
            .count(),
        balances: balances(expenses),
    }
}

// Only split expenses with a stored distribution and a known payer count.
fn balances(expenses: &[Expense]) -> Vec<PersonBalance> {
    let mut people: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

    for expense in expenses.iter().filter(|e| e.expense_type.is_split()) {
        let (Some(payer), Some(distribution)) = (&expense.paid_by, &expense.distribution) else {
            continue;
        };
        people.entry(payer.clone()).or_default().0 += expense.amount;
        for p in &distribution.participants {
            people.entry(p.name.clone()).or_default().1 += p.amount;
        }
    }

    people
        .into_iter()
        .map(|(name, (paid, share))| PersonBalance {
            name,
            paid,
            share,
            balance: paid - share,
        })
        .collect()
}

pub fn yearly_summary(year: i32, expenses: &[Expense]) -> YearlySummary {
    let months = (1..=12u32)
        .map(|m| {
            let mut row = MonthRow {
                month: format!("{year}-{m:02}"),
                personal: Decimal::ZERO,
                shared: Decimal::ZERO,
                child: Decimal::ZERO,
                total: Decimal::ZERO,
            };
            for e in expenses
                .iter()
                .filter(|e| e.spent_on.year() == year && e.spent_on.month() == m)
            {
                match e.expense_type {
                    ExpenseType::Personal => row.personal += e.amount,
                    ExpenseType::Shared => row.shared += e.amount,
                    ExpenseType::Child => row.child += e.amount,
                }
                row.total += e.amount;
            }
            row
        })
        .collect::<Vec<_>>();

    YearlySummary {
        year,
        total: months.iter().map(|r| r.total).sum(),
        months,
    }
}
