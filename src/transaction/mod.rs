//! Transactions: recording income and expenses, and finding them again.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod ledger;
mod list;

pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use db::{
    create_transaction_table, get_transaction, list_all_transactions, list_transactions,
    recent_transactions,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{Transaction, TransactionFields, TransactionFilter, TransactionType};
pub use edit::{edit_transaction_endpoint, get_edit_transaction_page};
pub use ledger::{delete_transaction, record_transaction, update_transaction};
pub use list::get_transactions_page;
