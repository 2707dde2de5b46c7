//! The page and endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppConfig, AppState, Error, UserID,
    database_id::TransactionID,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base, submit_button},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFields,
        form::{TransactionFormDefaults, transaction_form_fields},
        get_transaction, update_transaction,
    },
    user::check_owner,
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The allowed categories.
    pub config: Arc<AppConfig>,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_transaction_view(transaction: &Transaction, categories: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let defaults = TransactionFormDefaults {
        transaction_type: transaction.type_,
        amount: Some(transaction.amount),
        category: Some(&transaction.category),
        date: transaction.date,
        description: Some(&transaction.description),
        autofocus_amount: false,
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (transaction_form_fields(&defaults, categories, &[]))

                (submit_button("Save Changes"))
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

/// Renders the page for editing one of the user's transactions.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionID>,
    State(state): State<EditTransactionState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection)?;
    check_owner(transaction.user_id, user_id)?;

    Ok(edit_transaction_view(&transaction, &state.config.categories).into_response())
}

/// A route handler for updating a transaction, redirects to the transactions view on success.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<TransactionID>,
    State(state): State<EditTransactionState>,
    user_id: UserID,
    Form(fields): Form<TransactionFields>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(user_id, transaction_id, fields, &state.config, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::Validation(_) | Error::NotFound | Error::PermissionDenied),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
