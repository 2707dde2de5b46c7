//! Savings goals and the fields used to create them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    amount::{MAX_AMOUNT, check_amount},
    database_id::GoalID,
};

/// An amount a user wants to have saved by a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalID,
    /// The user that owns the goal.
    pub user_id: UserID,
    /// What the user is saving for.
    pub name: String,
    /// How much the user wants to save.
    pub target_amount: Decimal,
    /// How much has been saved so far.
    ///
    /// Recording income against the goal adds to this and recording an
    /// expense subtracts from it, so it may be negative or exceed the target.
    pub current_amount: Decimal,
    /// When the user wants to reach the target.
    pub target_date: Date,
}

impl Goal {
    /// Whether the target date has not passed yet.
    pub fn is_active(&self, today: Date) -> bool {
        self.target_date >= today
    }

    /// The saved amount as a percentage of the target, clamped to 0..=100.
    pub fn progress_percent(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let Some(percent) = self
            .current_amount
            .checked_div(self.target_amount)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        else {
            return if self.current_amount.is_sign_negative() {
                Decimal::ZERO
            } else {
                Decimal::ONE_HUNDRED
            };
        };

        percent
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp(0)
    }
}

/// The user supplied fields for a new goal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalFields {
    /// What the user is saving for.
    pub name: String,
    /// How much the user wants to save.
    pub target_amount: Decimal,
    /// How much is already saved, zero if not given.
    pub current_amount: Option<Decimal>,
    /// When the user wants to reach the target.
    pub target_date: Date,
}

impl GoalFields {
    /// Check the fields and trim the name.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the name is blank, the target amount is not
    /// positive, or either amount is more than [MAX_AMOUNT].
    pub fn validate(mut self) -> Result<Self, Error> {
        self.name = self.name.trim().to_owned();

        if self.name.is_empty() {
            return Err(Error::Validation("goal name cannot be empty".to_owned()));
        }

        check_amount(self.target_amount, "target amount")?;

        let current_amount = self.current_amount.unwrap_or(Decimal::ZERO);
        if current_amount.abs() > Decimal::from(MAX_AMOUNT) {
            return Err(Error::Validation(format!(
                "current amount cannot be more than {MAX_AMOUNT}"
            )));
        }

        Ok(self)
    }
}
