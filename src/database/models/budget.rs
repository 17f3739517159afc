use serde::{Serialize, Deserialize};
use rust_decimal::Decimal;

use super::expense::ExpenseType;

// monthly budget for one scope (personal / shared / child)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub month: String,       // 'YYYY-MM'
    pub scope: ExpenseType,
    pub amount: Decimal,
}

// PUT /api/budgets payload; one budget per (month, scope), later writes replace earlier ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBudget {
    pub month: String,
    pub scope: ExpenseType,
    pub amount: Decimal,
}
