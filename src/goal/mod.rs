//! Savings goals: what a user is saving for, how much, and by when.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::{create_goal_endpoint, get_new_goal_page};
pub use db::{create_goal, create_goal_table, delete_goal, get_goal, list_active_goals, list_goals};
pub(crate) use db::adjust_goal_amount;
pub use delete::delete_goal_endpoint;
pub use domain::{Goal, GoalFields};
pub use list::{get_goals_page, goal_progress_bar};
