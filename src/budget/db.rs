//! Database operations for budgets.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    AppConfig, Error, UserID,
    budget::{Budget, BudgetFields},
    database_id::BudgetID,
    amount::add_amounts,
    db::get_decimal,
    user::check_owner,
};

/// Create the budget table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                CHECK (start_date <= end_date)
            );

            CREATE INDEX IF NOT EXISTS idx_budget_user_dates ON budget(user_id, start_date, end_date);",
    )
}

/// Create a budget owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::Validation] if the fields are invalid or [Error::SqlError] if the insert fails.
pub fn create_budget(
    user_id: UserID,
    fields: BudgetFields,
    config: &AppConfig,
    connection: &Connection,
) -> Result<Budget, Error> {
    let fields = fields.validate(config)?;

    connection
        .prepare(
            "INSERT INTO budget (user_id, name, amount, category, period, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, name, amount, category, period, start_date, end_date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &fields.name,
                fields.amount.to_string(),
                &fields.category,
                &fields.period,
                fields.start_date,
                fields.end_date,
            ),
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Get the budget with `budget_id`, regardless of who owns it.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such budget.
pub fn get_budget(budget_id: BudgetID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category, period, start_date, end_date
             FROM budget WHERE id = :id",
        )?
        .query_row(&[(":id", &budget_id)], map_budget_row)
        .map_err(|error| error.into())
}

/// Get all budgets owned by `user_id`, latest start date first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category, period, start_date, end_date
             FROM budget WHERE user_id = ?1
             ORDER BY start_date DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Get the budgets owned by `user_id` whose window contains `today`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_active_budgets(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category, period, start_date, end_date
             FROM budget WHERE user_id = ?1 AND start_date <= ?2 AND end_date >= ?2
             ORDER BY start_date DESC, id DESC",
        )?
        .query_map((user_id.as_i64(), today), map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Delete the budget with `budget_id` on behalf of `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such budget or
/// [Error::PermissionDenied] if `user_id` does not own it.
pub fn delete_budget(
    user_id: UserID,
    budget_id: BudgetID,
    connection: &Connection,
) -> Result<(), Error> {
    let budget = get_budget(budget_id, connection)?;
    check_owner(budget.user_id, user_id)?;

    connection.execute("DELETE FROM budget WHERE id = ?1", [budget_id])?;

    Ok(())
}

/// The total of the owner's expenses in the budget's category and window.
///
/// # Errors
///
/// - [Error::SqlError] if the query fails.
/// - [Error::Validation] if the total does not fit in a [Decimal].
pub fn budget_spending(budget: &Budget, connection: &Connection) -> Result<Decimal, Error> {
    connection
        .prepare(
            "SELECT amount FROM \"transaction\"
             WHERE user_id = ?1 AND type = 'expense' AND category = ?2
                AND date >= ?3 AND date <= ?4",
        )?
        .query_map(
            (
                budget.user_id.as_i64(),
                &budget.category,
                budget.start_date,
                budget.end_date,
            ),
            |row| get_decimal(row, 0),
        )?
        .try_fold(Decimal::ZERO, |total, amount| add_amounts(total, amount?))
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        amount: get_decimal(row, 3)?,
        category: row.get(4)?,
        period: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
    })
}

#[cfg(test)]
mod budget_db_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        AppConfig, Error,
        budget::BudgetFields,
        test_utils::{create_test_user, get_test_connection},
        transaction::{TransactionFields, TransactionType, record_transaction},
    };

    use super::{
        budget_spending, create_budget, delete_budget, get_budget, list_active_budgets,
        list_budgets,
    };

    fn fields(name: &str, start_date: time::Date, end_date: time::Date) -> BudgetFields {
        BudgetFields {
            name: name.to_owned(),
            amount: dec!(200),
            category: "food".to_owned(),
            period: "monthly".to_owned(),
            start_date,
            end_date,
        }
    }

    #[test]
    fn create_and_get_budget() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);

        let budget = create_budget(
            user_id,
            fields("Food", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();

        assert_eq!(budget.amount, dec!(200));
        assert_eq!(get_budget(budget.id, &connection), Ok(budget));
    }

    #[test]
    fn list_budgets_latest_start_first_and_owner_scoped() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let config = AppConfig::default();
        let march = create_budget(
            alice,
            fields("March", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &config,
            &connection,
        )
        .unwrap();
        let april = create_budget(
            alice,
            fields("April", date!(2024 - 04 - 01), date!(2024 - 04 - 30)),
            &config,
            &connection,
        )
        .unwrap();
        create_budget(
            bob,
            fields("Bob's", date!(2024 - 05 - 01), date!(2024 - 05 - 31)),
            &config,
            &connection,
        )
        .unwrap();

        assert_eq!(list_budgets(alice, &connection), Ok(vec![april, march]));
    }

    #[test]
    fn list_active_budgets_uses_inclusive_window() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let config = AppConfig::default();
        let march = create_budget(
            user_id,
            fields("March", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &config,
            &connection,
        )
        .unwrap();

        assert_eq!(
            list_active_budgets(user_id, date!(2024 - 03 - 31), &connection),
            Ok(vec![march.clone()])
        );
        assert_eq!(
            list_active_budgets(user_id, date!(2024 - 03 - 01), &connection),
            Ok(vec![march])
        );
        assert_eq!(
            list_active_budgets(user_id, date!(2024 - 04 - 01), &connection),
            Ok(vec![])
        );
    }

    #[test]
    fn delete_budget_checks_owner() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let budget = create_budget(
            alice,
            fields("March", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_budget(bob, budget.id, &connection),
            Err(Error::PermissionDenied)
        );
        assert_eq!(delete_budget(alice, budget.id, &connection), Ok(()));
        assert_eq!(
            delete_budget(alice, budget.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn spending_counts_matching_expenses_in_window() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let config = AppConfig::default();
        let budget = create_budget(
            user_id,
            fields("March", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &config,
            &connection,
        )
        .unwrap();
        let records = [
            (TransactionType::Expense, "food", dec!(50.00), date!(2024 - 03 - 01)),
            (TransactionType::Expense, "food", dec!(30.50), date!(2024 - 03 - 31)),
            (TransactionType::Expense, "food", dec!(99), date!(2024 - 04 - 01)),
            (TransactionType::Expense, "transport", dec!(7), date!(2024 - 03 - 10)),
            (TransactionType::Income, "food", dec!(1000), date!(2024 - 03 - 10)),
        ];
        for (type_, category, amount, date) in records {
            record_transaction(
                user_id,
                TransactionFields {
                    amount,
                    type_,
                    category: category.to_owned(),
                    description: String::new(),
                    date,
                },
                None,
                &config,
                &connection,
            )
            .unwrap();
        }

        assert_eq!(budget_spending(&budget, &connection), Ok(dec!(80.50)));
    }

    #[test]
    fn budget_spending_reports_overflow_as_error() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let budget = create_budget(
            user_id,
            fields("March", date!(2024 - 03 - 01), date!(2024 - 03 - 31)),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();
        for _ in 0..2 {
            connection
                .execute(
                    "INSERT INTO \"transaction\" (user_id, amount, type, category, date)
                     VALUES (?1, ?2, 'expense', 'food', ?3)",
                    (
                        user_id.as_i64(),
                        Decimal::MAX.to_string(),
                        date!(2024 - 03 - 10),
                    ),
                )
                .unwrap();
        }

        let got = budget_spending(&budget, &connection);

        assert!(matches!(got, Err(Error::Validation(_))));
    }
}
