//! The page and endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppConfig, AppState, Error, UserID,
    database_id::GoalID,
    endpoints,
    goal::{Goal, list_active_goals},
    html::{FORM_CONTAINER_STYLE, base, submit_button},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        TransactionFields, TransactionType,
        form::{TransactionFormDefaults, transaction_form_fields},
        record_transaction,
    },
};

/// The state needed to show the form and record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The allowed categories.
    pub config: Arc<AppConfig>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn new_transaction_view(today: Date, categories: &[String], goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let defaults = TransactionFormDefaults {
        transaction_type: TransactionType::Expense,
        amount: None,
        category: None,
        date: today,
        description: None,
        autofocus_amount: true,
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (transaction_form_fields(&defaults, categories, goals))

                (submit_button("Record Transaction"))
            }
        }
    };

    base("New Transaction", &[], &content)
}

/// Render the page for recording a transaction.
///
/// The user's active goals are offered so the transaction can count towards one.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = list_active_goals(user_id, today, &connection)
        .inspect_err(|error| tracing::error!("could not get goals: {error}"))?;

    Ok(new_transaction_view(today, &state.config.categories, &goals).into_response())
}

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// How much money moved.
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// One of the configured categories.
    pub category: String,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The goal to count the transaction towards.
    #[serde(default)]
    pub goal_id: Option<GoalID>,
}

impl TransactionForm {
    fn into_parts(self) -> (TransactionFields, Option<GoalID>) {
        (
            TransactionFields {
                amount: self.amount,
                type_: self.type_,
                category: self.category,
                description: self.description,
                date: self.date,
            },
            self.goal_id,
        )
    }
}

/// A route handler for recording a transaction, redirects to the transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    user_id: UserID,
    Form(form): Form<TransactionForm>,
) -> Response {
    let (fields, goal_id) = form.into_parts();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match record_transaction(user_id, fields, goal_id, &state.config, &connection) {
        Ok(transaction) => {
            tracing::debug!("User {user_id} recorded transaction {}", transaction.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(
            error @ (Error::Validation(_) | Error::NotFound | Error::PermissionDenied),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not record transaction: {error}");
            error.into_alert_response()
        }
    }
}
