//! Database setup and helpers shared by the domain modules.

use std::str::FromStr;

use rust_decimal::Decimal;
use rusqlite::{Connection, Row, types::Type};

use crate::{
    budget::create_budget_table, goal::create_goal_table, knowledge::create_knowledge_tables,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for all domain models in one transaction.
///
/// Tables are created with `IF NOT EXISTS`, so this is safe to call on an existing database.
///
/// # Errors
/// Returns an error if a table cannot be created or foreign keys cannot be enabled.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_knowledge_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Read a decimal amount stored as text in column `index`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
