//! Budgets and the fields used to create them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppConfig, Error, UserID, amount::check_amount, database_id::BudgetID};

/// A spending cap for one category over a window of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetID,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// A label for the budget, e.g. "Groceries".
    pub name: String,
    /// The most the user wants to spend.
    pub amount: Decimal,
    /// The category of expenses the budget covers.
    pub category: String,
    /// One of the configured period labels, e.g. "monthly".
    pub period: String,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers.
    pub end_date: Date,
}

impl Budget {
    /// Whether `today` falls between the start and end dates, inclusive.
    pub fn is_active(&self, today: Date) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// The user supplied fields for a new budget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetFields {
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub period: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl BudgetFields {
    /// Check the fields against `config` and trim the name.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the name is blank, the amount is not
    /// positive or too large, the category or period is not configured, or the budget
    /// ends before it starts.
    pub fn validate(mut self, config: &AppConfig) -> Result<Self, Error> {
        self.name = self.name.trim().to_owned();

        if self.name.is_empty() {
            return Err(Error::Validation("budget name cannot be empty".to_owned()));
        }

        check_amount(self.amount, "budget amount")?;

        if !config.is_category(&self.category) {
            return Err(Error::Validation(format!(
                "\"{}\" is not one of the categories: {}",
                self.category,
                config.categories.join(", ")
            )));
        }

        if !config.is_budget_period(&self.period) {
            return Err(Error::Validation(format!(
                "\"{}\" is not one of the periods: {}",
                self.period,
                config.budget_periods.join(", ")
            )));
        }

        if self.start_date > self.end_date {
            return Err(Error::Validation(
                "the start date must not be after the end date".to_owned(),
            ));
        }

        Ok(self)
    }
}
