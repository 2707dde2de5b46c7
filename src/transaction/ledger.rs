//! Recording, updating, and deleting transactions on behalf of their owner.

use rusqlite::Connection;

use crate::{
    AppConfig, Error, UserID,
    database_id::{GoalID, TransactionID},
    goal::{adjust_goal_amount, get_goal},
    transaction::{
        Transaction, TransactionFields,
        db::{get_transaction, insert_transaction, overwrite_transaction, remove_transaction},
    },
    user::check_owner,
};

/// Record a transaction for `user_id`, optionally against one of their goals.
///
/// Income adds the amount to the goal's saved amount and expenses subtract
/// it. The insert and the goal update happen in one database transaction.
///
/// # Errors
///
/// - [Error::Validation] if `fields` are invalid or the goal's saved amount
///   would overflow. Nothing is recorded in that case.
/// - [Error::NotFound] if `goal_id` does not refer to a goal.
/// - [Error::PermissionDenied] if the goal belongs to another user.
/// - [Error::SqlError] if a query fails.
pub fn record_transaction(
    user_id: UserID,
    fields: TransactionFields,
    goal_id: Option<GoalID>,
    config: &AppConfig,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let fields = fields.validate(config)?;

    let sql_transaction = connection.unchecked_transaction()?;

    if let Some(goal_id) = goal_id {
        let goal = get_goal(goal_id, &sql_transaction)?;
        check_owner(goal.user_id, user_id)?;
    }

    let transaction = insert_transaction(user_id, &fields, goal_id, &sql_transaction)?;

    if let Some(goal_id) = goal_id {
        let new_amount = adjust_goal_amount(goal_id, transaction.signed_amount(), &sql_transaction)?;
        tracing::debug!("Goal {goal_id} now has {new_amount} saved");
    }

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Overwrite the fields of a transaction owned by `user_id`.
///
/// The linked goal, if any, is left as is.
///
/// # Errors
///
/// - [Error::Validation] if `fields` are invalid.
/// - [Error::NotFound] if there is no such transaction.
/// - [Error::PermissionDenied] if the transaction belongs to another user.
pub fn update_transaction(
    user_id: UserID,
    transaction_id: TransactionID,
    fields: TransactionFields,
    config: &AppConfig,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(transaction_id, connection)?;
    check_owner(existing.user_id, user_id)?;

    let fields = fields.validate(config)?;

    overwrite_transaction(transaction_id, &fields, connection)
}

/// Delete a transaction owned by `user_id`.
///
/// The linked goal, if any, keeps its saved amount.
///
/// # Errors
///
/// - [Error::NotFound] if there is no such transaction.
/// - [Error::PermissionDenied] if the transaction belongs to another user.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionID,
    connection: &Connection,
) -> Result<(), Error> {
    let existing = get_transaction(transaction_id, connection)?;
    check_owner(existing.user_id, user_id)?;

    remove_transaction(transaction_id, connection)
}

#[cfg(test)]
mod ledger_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        AppConfig, Error, UserID,
        goal::{Goal, GoalFields, create_goal, get_goal},
        test_utils::{create_test_user, get_test_connection},
        transaction::{
            TransactionFields, TransactionFilter, TransactionType, db::get_transaction,
            list_transactions,
        },
    };

    use super::{delete_transaction, record_transaction, update_transaction};

    fn expense(amount: Decimal) -> TransactionFields {
        TransactionFields {
            amount,
            type_: TransactionType::Expense,
            category: "food".to_owned(),
            description: "  lunch  ".to_owned(),
            date: date!(2024 - 03 - 15),
        }
    }

    fn income(amount: Decimal) -> TransactionFields {
        TransactionFields {
            type_: TransactionType::Income,
            category: "salary".to_owned(),
            ..expense(amount)
        }
    }

    fn goal_for(user_id: UserID, connection: &Connection) -> Goal {
        create_goal(
            user_id,
            GoalFields {
                name: "Holiday".to_owned(),
                target_amount: dec!(1000),
                current_amount: Some(dec!(100)),
                target_date: date!(2030 - 01 - 01),
            },
            connection,
        )
        .unwrap()
    }

    fn transaction_count(user_id: UserID, connection: &Connection) -> u64 {
        list_transactions(user_id, &TransactionFilter::default(), 1, 10, connection)
            .unwrap()
            .total
    }

    #[test]
    fn record_transaction_trims_description() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);

        let transaction =
            record_transaction(user_id, expense(dec!(5)), None, &AppConfig::default(), &connection)
                .unwrap();

        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.description, "lunch");
        assert_eq!(transaction.goal_id, None);
    }

    #[test]
    fn record_transaction_rejects_invalid_fields() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let config = AppConfig::default();

        let zero = record_transaction(user_id, expense(dec!(0)), None, &config, &connection);
        let negative = record_transaction(user_id, expense(dec!(-1)), None, &config, &connection);
        let bad_category = record_transaction(
            user_id,
            TransactionFields {
                category: "crypto".to_owned(),
                ..expense(dec!(1))
            },
            None,
            &config,
            &connection,
        );

        assert!(matches!(zero, Err(Error::Validation(_))));
        assert!(matches!(negative, Err(Error::Validation(_))));
        assert!(matches!(bad_category, Err(Error::Validation(_))));
        assert_eq!(transaction_count(user_id, &connection), 0);
    }

    #[test]
    fn income_adds_to_goal() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);

        let transaction = record_transaction(
            user_id,
            income(dec!(50.25)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.goal_id, Some(goal.id));
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(150.25)
        );
    }

    #[test]
    fn amount_over_limit_is_rejected() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);

        let got = record_transaction(
            user_id,
            income(Decimal::MAX),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        );

        assert!(matches!(got, Err(Error::Validation(_))));
        assert_eq!(transaction_count(user_id, &connection), 0);
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(100)
        );
    }

    #[test]
    fn goal_overflow_rolls_back_transaction() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);
        connection
            .execute(
                "UPDATE goal SET current_amount = ?1 WHERE id = ?2",
                (Decimal::MAX.to_string(), goal.id),
            )
            .unwrap();

        let got = record_transaction(
            user_id,
            income(dec!(1)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        );

        assert!(matches!(got, Err(Error::Validation(_))));
        assert_eq!(transaction_count(user_id, &connection), 0);
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            Decimal::MAX
        );

        record_transaction(user_id, income(dec!(1)), None, &AppConfig::default(), &connection)
            .unwrap();
        assert_eq!(transaction_count(user_id, &connection), 1);
    }

    #[test]
    fn expense_subtracts_from_goal_without_floor() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);

        record_transaction(
            user_id,
            expense(dec!(130)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(-30)
        );
    }

    #[test]
    fn missing_goal_records_nothing() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);

        let result = record_transaction(
            user_id,
            income(dec!(10)),
            Some(42),
            &AppConfig::default(),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(transaction_count(user_id, &connection), 0);
    }

    #[test]
    fn other_users_goal_is_denied_and_untouched() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let goal = goal_for(alice, &connection);

        let result = record_transaction(
            bob,
            income(dec!(10)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        );

        assert_eq!(result, Err(Error::PermissionDenied));
        assert_eq!(transaction_count(bob, &connection), 0);
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(100)
        );
    }

    #[test]
    fn failed_goal_update_rolls_back_insert() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);
        connection
            .execute_batch(
                "CREATE TRIGGER reject_goal_update BEFORE UPDATE ON goal
                 BEGIN SELECT RAISE(ABORT, 'goal is locked'); END;",
            )
            .unwrap();

        let result = record_transaction(
            user_id,
            income(dec!(10)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
        assert_eq!(transaction_count(user_id, &connection), 0);
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(100)
        );
    }

    #[test]
    fn update_transaction_overwrites_fields_but_not_goal() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);
        let config = AppConfig::default();
        let transaction =
            record_transaction(user_id, income(dec!(10)), Some(goal.id), &config, &connection)
                .unwrap();

        let updated = update_transaction(
            user_id,
            transaction.id,
            TransactionFields {
                description: "bonus".to_owned(),
                date: date!(2024 - 04 - 01),
                ..income(dec!(99))
            },
            &config,
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, dec!(99));
        assert_eq!(updated.description, "bonus");
        assert_eq!(updated.date, date!(2024 - 04 - 01));
        assert_eq!(updated.goal_id, Some(goal.id));
        assert_eq!(get_transaction(transaction.id, &connection), Ok(updated));
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(110)
        );
    }

    #[test]
    fn update_checks_existence_and_owner() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let config = AppConfig::default();
        let transaction =
            record_transaction(alice, expense(dec!(10)), None, &config, &connection).unwrap();

        let missing = update_transaction(alice, 999, expense(dec!(1)), &config, &connection);
        let denied = update_transaction(bob, transaction.id, expense(dec!(1)), &config, &connection);

        assert_eq!(missing, Err(Error::NotFound));
        assert_eq!(denied, Err(Error::PermissionDenied));
        assert_eq!(
            get_transaction(transaction.id, &connection).unwrap().amount,
            dec!(10)
        );
    }

    #[test]
    fn delete_transaction_keeps_goal_amount() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let goal = goal_for(user_id, &connection);
        let transaction = record_transaction(
            user_id,
            income(dec!(10)),
            Some(goal.id),
            &AppConfig::default(),
            &connection,
        )
        .unwrap();

        delete_transaction(user_id, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(transaction.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(110)
        );
    }

    #[test]
    fn delete_checks_existence_and_owner() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let transaction =
            record_transaction(alice, expense(dec!(10)), None, &AppConfig::default(), &connection)
                .unwrap();

        assert_eq!(delete_transaction(alice, 999, &connection), Err(Error::NotFound));
        assert_eq!(
            delete_transaction(bob, transaction.id, &connection),
            Err(Error::PermissionDenied)
        );
        assert!(get_transaction(transaction.id, &connection).is_ok());
    }
}
