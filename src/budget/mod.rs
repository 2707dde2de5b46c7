//! Budgets: spending caps for a category over a window of days.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::{create_budget_endpoint, get_new_budget_page};
pub use db::{
    budget_spending, create_budget, create_budget_table, delete_budget, get_budget,
    list_active_budgets, list_budgets,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetFields};
pub use list::{BudgetProgress, budget_spending_summary, get_budgets_page};
