//! Transactions, their type, and the fields users fill in to record them.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppConfig, Error, UserID,
    amount::check_amount,
    database_id::{GoalID, TransactionID},
};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a transaction type, expected income or expense"
            ))),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// How much money moved. Always positive, the direction comes from `type_`.
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// One of the configured categories.
    pub category: String,
    /// What the transaction was for. May be empty.
    pub description: String,
    /// The day the transaction happened.
    pub date: Date,
    /// The goal the transaction was recorded against, if any.
    pub goal_id: Option<GoalID>,
}

impl Transaction {
    /// The amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.type_ {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// The user editable fields of a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionFields {
    /// How much money moved, must be positive.
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// One of the configured categories.
    pub category: String,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The day the transaction happened.
    pub date: Date,
}

impl TransactionFields {
    /// Check the fields against `config` and trim the free text.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the amount is not positive or more than
    /// [MAX_AMOUNT](crate::amount::MAX_AMOUNT), or if the category is empty or
    /// not one of the configured categories.
    pub fn validate(mut self, config: &AppConfig) -> Result<Self, Error> {
        check_amount(self.amount, "amount")?;

        self.category = self.category.trim().to_owned();
        if self.category.is_empty() {
            return Err(Error::Validation("a category is required".to_owned()));
        }
        if !config.is_category(&self.category) {
            return Err(Error::Validation(format!(
                "\"{}\" is not one of the categories: {}",
                self.category,
                config.categories.join(", ")
            )));
        }

        self.description = self.description.trim().to_owned();

        Ok(self)
    }
}

/// Optional conditions for listing transactions. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions of this type.
    pub type_: Option<TransactionType>,
    /// Only transactions in exactly this category.
    pub category: Option<String>,
    /// Only transactions on or after this day.
    pub start_date: Option<Date>,
    /// Only transactions on or before this day.
    pub end_date: Option<Date>,
}

#[cfg(test)]
mod transaction_domain_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{AppConfig, Error, UserID};

    use super::{Transaction, TransactionFields, TransactionType};

    fn fields(amount: rust_decimal::Decimal, category: &str) -> TransactionFields {
        TransactionFields {
            amount,
            type_: TransactionType::Expense,
            category: category.to_owned(),
            description: "  lunch ".to_owned(),
            date: date!(2024 - 03 - 15),
        }
    }

    #[test]
    fn transaction_type_parses_lowercase_names() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert!(matches!(
            "Income".parse::<TransactionType>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn validate_accepts_configured_category() {
        let got = fields(dec!(12.50), " food ")
            .validate(&AppConfig::default())
            .unwrap();

        assert_eq!(got.category, "food");
        assert_eq!(got.description, "lunch");
    }

    #[test]
    fn validate_rejects_out_of_range_amount() {
        for amount in [dec!(0), dec!(-1), rust_decimal::Decimal::MAX] {
            assert!(matches!(
                fields(amount, "food").validate(&AppConfig::default()),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_unknown_or_empty_category() {
        for category in ["", "gambling"] {
            assert!(matches!(
                fields(dec!(1), category).validate(&AppConfig::default()),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn signed_amount_is_negative_for_expenses() {
        let mut transaction = Transaction {
            id: 1,
            user_id: UserID::new(1),
            amount: dec!(20),
            type_: TransactionType::Expense,
            category: "food".to_owned(),
            description: String::new(),
            date: date!(2024 - 03 - 15),
            goal_id: None,
        };

        assert_eq!(transaction.signed_amount(), dec!(-20));
        transaction.type_ = TransactionType::Income;
        assert_eq!(transaction.signed_amount(), dec!(20));
    }
}
