//! Database operations for goals.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, UserID,
    amount::add_amounts,
    database_id::GoalID,
    db::get_decimal,
    goal::{Goal, GoalFields},
    user::check_owner,
};

/// Create the goal table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                target_amount TEXT NOT NULL,
                current_amount TEXT NOT NULL DEFAULT '0',
                target_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_goal_user_date ON goal(user_id, target_date);",
    )
}

/// Create a goal owned by `user_id`.
///
/// The saved amount starts at zero unless `fields` says otherwise.
///
/// # Errors
///
/// Returns [Error::Validation] if the fields are invalid or [Error::SqlError] if the insert fails.
pub fn create_goal(
    user_id: UserID,
    fields: GoalFields,
    connection: &Connection,
) -> Result<Goal, Error> {
    let fields = fields.validate()?;
    let current_amount = fields.current_amount.unwrap_or(Decimal::ZERO);

    connection
        .prepare(
            "INSERT INTO goal (user_id, name, target_amount, current_amount, target_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, name, target_amount, current_amount, target_date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &fields.name,
                fields.target_amount.to_string(),
                current_amount.to_string(),
                fields.target_date,
            ),
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Get the goal with `goal_id`, regardless of who owns it.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such goal.
pub fn get_goal(goal_id: GoalID, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, target_date
             FROM goal WHERE id = :id",
        )?
        .query_row(&[(":id", &goal_id)], map_goal_row)
        .map_err(|error| error.into())
}

/// Get all goals owned by `user_id`, soonest target date first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, target_date
             FROM goal WHERE user_id = ?1
             ORDER BY target_date ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Get the goals owned by `user_id` whose target date is `today` or later.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_active_goals(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, target_date
             FROM goal WHERE user_id = ?1 AND target_date >= ?2
             ORDER BY target_date ASC, id ASC",
        )?
        .query_map((user_id.as_i64(), today), map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Delete the goal with `goal_id` on behalf of `user_id`.
///
/// Transactions recorded against the goal keep their rows, with the link cleared.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such goal or
/// [Error::PermissionDenied] if `user_id` does not own it.
pub fn delete_goal(user_id: UserID, goal_id: GoalID, connection: &Connection) -> Result<(), Error> {
    let goal = get_goal(goal_id, connection)?;
    check_owner(goal.user_id, user_id)?;

    connection.execute("DELETE FROM goal WHERE id = ?1", [goal_id])?;

    Ok(())
}

/// Add `delta` to the saved amount of `goal_id` and return the new amount.
///
/// Callers are responsible for the ownership check.
///
/// # Errors
///
/// - [Error::NotFound] if there is no such goal.
/// - [Error::Validation] if the new amount would overflow.
pub(crate) fn adjust_goal_amount(
    goal_id: GoalID,
    delta: Decimal,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let current_amount = get_goal(goal_id, connection)?.current_amount;
    let new_amount = add_amounts(current_amount, delta)?;

    connection.execute(
        "UPDATE goal SET current_amount = ?1 WHERE id = ?2",
        (new_amount.to_string(), goal_id),
    )?;

    Ok(new_amount)
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        target_amount: get_decimal(row, 3)?,
        current_amount: get_decimal(row, 4)?,
        target_date: row.get(5)?,
    })
}
