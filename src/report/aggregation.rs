//! Totals of a user's transactions by category and by month.

use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Month;

use crate::{
    Error, UserID,
    amount::add_amounts,
    transaction::{Transaction, TransactionType, list_all_transactions},
};

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl YearMonth {
    /// The month as "YYYY-MM".
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl From<time::Date> for YearMonth {
    fn from(date: time::Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }
}

impl From<(i32, Month)> for YearMonth {
    fn from((year, month): (i32, Month)) -> Self {
        Self {
            year,
            month: u8::from(month),
        }
    }
}

/// The income and expense totals for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFlow {
    pub month: YearMonth,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Sum the expenses in `transactions` per category.
///
/// Categories without expenses are left out and the map is ordered by category name.
///
/// # Errors
///
/// Returns [Error::Validation] if a total does not fit in a [Decimal].
pub fn sum_expenses_by_category(
    transactions: &[Transaction],
) -> Result<BTreeMap<String, Decimal>, Error> {
    let mut totals = BTreeMap::new();

    for transaction in transactions {
        if transaction.type_ == TransactionType::Expense {
            let total = totals
                .entry(transaction.category.clone())
                .or_insert(Decimal::ZERO);
            *total = add_amounts(*total, transaction.amount)?;
        }
    }

    Ok(totals)
}

/// Sum income and expenses in `transactions` per month.
///
/// Only months with at least one transaction are included, oldest first.
///
/// # Errors
///
/// Returns [Error::Validation] if a total does not fit in a [Decimal].
pub fn sum_monthly_flow(transactions: &[Transaction]) -> Result<Vec<MonthlyFlow>, Error> {
    let mut totals: BTreeMap<YearMonth, (Decimal, Decimal)> = BTreeMap::new();

    for transaction in transactions {
        let (income, expense) = totals
            .entry(YearMonth::from(transaction.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));

        let total = match transaction.type_ {
            TransactionType::Income => income,
            TransactionType::Expense => expense,
        };
        *total = add_amounts(*total, transaction.amount)?;
    }

    Ok(totals
        .into_iter()
        .map(|(month, (income, expense))| MonthlyFlow {
            month,
            income,
            expense,
        })
        .collect())
}

/// The user's total expenses per category.
///
/// # Errors
///
/// - [Error::SqlError] if the transactions cannot be read.
/// - [Error::Validation] if a total does not fit in a [Decimal].
pub fn expense_by_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<BTreeMap<String, Decimal>, Error> {
    let transactions = list_all_transactions(user_id, connection)?;

    sum_expenses_by_category(&transactions)
}

/// The user's income and expense totals for each month they recorded a transaction.
///
/// # Errors
///
/// - [Error::SqlError] if the transactions cannot be read.
/// - [Error::Validation] if a total does not fit in a [Decimal].
pub fn monthly_flow(user_id: UserID, connection: &Connection) -> Result<Vec<MonthlyFlow>, Error> {
    let transactions = list_all_transactions(user_id, connection)?;

    sum_monthly_flow(&transactions)
}

#[cfg(test)]
mod aggregation_tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, Month, macros::date};

    use crate::{
        AppConfig, Error, UserID,
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionFields, TransactionType, record_transaction},
    };

    use super::{
        MonthlyFlow, YearMonth, expense_by_category, monthly_flow, sum_expenses_by_category,
        sum_monthly_flow,
    };

    fn transaction(
        type_: TransactionType,
        category: &str,
        amount: Decimal,
        date: Date,
    ) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            amount,
            type_,
            category: category.to_owned(),
            description: String::new(),
            date,
            goal_id: None,
        }
    }

    #[test]
    fn expenses_by_category_skips_income_and_sorts_names() {
        let transactions = [
            transaction(TransactionType::Expense, "transport", dec!(5), date!(2024 - 01 - 02)),
            transaction(TransactionType::Expense, "food", dec!(10.25), date!(2024 - 01 - 03)),
            transaction(TransactionType::Income, "salary", dec!(1000), date!(2024 - 01 - 04)),
            transaction(TransactionType::Expense, "food", dec!(4.75), date!(2024 - 02 - 01)),
        ];

        let got = sum_expenses_by_category(&transactions).unwrap();

        let want = BTreeMap::from([
            ("food".to_owned(), dec!(15.00)),
            ("transport".to_owned(), dec!(5)),
        ]);
        assert_eq!(got, want);
        assert_eq!(
            got.keys().collect::<Vec<_>>(),
            vec!["food", "transport"]
        );
    }

    #[test]
    fn totals_that_overflow_are_errors() {
        let transactions = [
            transaction(TransactionType::Expense, "food", Decimal::MAX, date!(2024 - 03 - 01)),
            transaction(TransactionType::Expense, "food", Decimal::MAX, date!(2024 - 03 - 02)),
        ];

        assert!(matches!(
            sum_expenses_by_category(&transactions),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            sum_monthly_flow(&transactions),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn empty_ledger_has_no_totals() {
        assert!(sum_expenses_by_category(&[]).unwrap().is_empty());
        assert!(sum_monthly_flow(&[]).unwrap().is_empty());
    }

    #[test]
    fn monthly_flow_is_chronological_with_zero_defaults() {
        let transactions = [
            transaction(TransactionType::Income, "salary", dec!(100), date!(2024 - 03 - 31)),
            transaction(TransactionType::Expense, "food", dec!(20), date!(2023 - 12 - 01)),
            transaction(TransactionType::Expense, "food", dec!(5), date!(2024 - 03 - 01)),
        ];

        let got = sum_monthly_flow(&transactions).unwrap();

        assert_eq!(
            got,
            vec![
                MonthlyFlow {
                    month: YearMonth::from((2023, Month::December)),
                    income: dec!(0),
                    expense: dec!(20),
                },
                MonthlyFlow {
                    month: YearMonth::from((2024, Month::March)),
                    income: dec!(100),
                    expense: dec!(5),
                },
            ]
        );
    }

    #[test]
    fn year_month_label_is_zero_padded() {
        assert_eq!(YearMonth::from(date!(2024 - 03 - 15)).label(), "2024-03");
    }

    #[test]
    fn totals_from_database_are_owner_scoped() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let config = AppConfig::default();
        for (user_id, amount) in [(alice, dec!(50.00)), (alice, dec!(30.00)), (bob, dec!(7))] {
            record_transaction(
                user_id,
                TransactionFields {
                    amount,
                    type_: TransactionType::Expense,
                    category: "food".to_owned(),
                    description: String::new(),
                    date: date!(2024 - 03 - 10),
                },
                None,
                &config,
                &connection,
            )
            .unwrap();
        }

        assert_eq!(
            expense_by_category(alice, &connection),
            Ok(BTreeMap::from([("food".to_owned(), dec!(80.00))]))
        );
        assert_eq!(
            monthly_flow(alice, &connection),
            Ok(vec![MonthlyFlow {
                month: YearMonth::from((2024, Month::March)),
                income: dec!(0),
                expense: dec!(80.00),
            }])
        );
    }
}
