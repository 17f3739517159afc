pub mod expense;
pub mod budget;

pub use expense::{
    month_key, parse_month, Distribution, Expense, ExpenseStatus, ExpenseType, NewExpense, StatusUpdate,
};
pub use budget::{Budget, SetBudget};
