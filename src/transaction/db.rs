//! Database queries for transactions.

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error, UserID,
    database_id::{GoalID, TransactionID},
    db::get_decimal,
    pagination::{Page, limit_offset},
    transaction::{Transaction, TransactionFields, TransactionFilter, TransactionType},
};

const TRANSACTION_COLUMNS: &str = "id, user_id, amount, type, category, description, date, goal_id";

/// Create the transaction table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                amount TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                goal_id INTEGER REFERENCES goal(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transaction_user_date
                ON \"transaction\"(user_id, date);",
    )
}

/// Insert a transaction without validating it or touching the goal.
pub(super) fn insert_transaction(
    user_id: UserID,
    fields: &TransactionFields,
    goal_id: Option<GoalID>,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, type, category, description, date, goal_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                fields.amount.to_string(),
                fields.type_.as_str(),
                &fields.category,
                &fields.description,
                fields.date,
                goal_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Get the transaction with `transaction_id`, regardless of who owns it.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such transaction.
pub fn get_transaction(
    transaction_id: TransactionID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &transaction_id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Overwrite the editable fields of a transaction.
pub(super) fn overwrite_transaction(
    transaction_id: TransactionID,
    fields: &TransactionFields,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET amount = ?1, type = ?2, category = ?3, description = ?4, date = ?5
             WHERE id = ?6
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                fields.amount.to_string(),
                fields.type_.as_str(),
                &fields.category,
                &fields.description,
                fields.date,
                transaction_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Remove a transaction row.
pub(super) fn remove_transaction(
    transaction_id: TransactionID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [transaction_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get one page of the transactions owned by `user_id` that match `filter`.
///
/// Transactions are ordered newest first, with ties broken by the most
/// recently recorded.
///
/// # Errors
///
/// Returns [Error::Validation] if `page` or `page_size` is zero, or
/// [Error::SqlError] if a query fails.
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Page<Transaction>, Error> {
    let (limit, offset) = limit_offset(page, page_size)?;

    let mut conditions = vec!["user_id = ?"];
    let mut params = vec![Value::Integer(user_id.as_i64())];

    if let Some(type_) = filter.type_ {
        conditions.push("type = ?");
        params.push(Value::Text(type_.as_str().to_owned()));
    }

    if let Some(category) = &filter.category {
        conditions.push("category = ?");
        params.push(Value::Text(category.clone()));
    }

    if let Some(start_date) = filter.start_date {
        conditions.push("date >= ?");
        params.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        conditions.push("date <= ?");
        params.push(Value::Text(end_date.to_string()));
    }

    let where_clause = conditions.join(" AND ");

    let total: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM \"transaction\" WHERE {where_clause}"),
        params_from_iter(params.iter()),
        |row| row.get(0),
    )?;

    params.push(Value::Integer(limit));
    params.push(Value::Integer(offset));

    let items = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {where_clause}
             ORDER BY date DESC, id DESC
             LIMIT ? OFFSET ?"
        ))?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        page,
        page_size,
        total: total as u64,
    })
}

/// Get the `limit` most recent transactions owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn recent_transactions(
    user_id: UserID,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit as i64), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get every transaction owned by `user_id`, oldest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?1
             ORDER BY date ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Map a row with the columns in [TRANSACTION_COLUMNS] to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let type_ = raw_type.parse::<TransactionType>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: get_decimal(row, 2)?,
        type_,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        goal_id: row.get(7)?,
    })
}
