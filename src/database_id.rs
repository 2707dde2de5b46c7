//! Database ID type definitions.

/// The ID of a row in the transaction table.
pub type TransactionID = i64;
/// The ID of a row in the budget table.
pub type BudgetID = i64;
/// The ID of a row in the goal table.
pub type GoalID = i64;
/// The ID of a row in the knowledge table.
pub type ArticleID = i64;
