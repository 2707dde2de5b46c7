//! Budget creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppConfig, AppState, Error, UserID,
    budget::{BudgetFields, create_budget},
    endpoints,
    html::{FORM_CONTAINER_STYLE, amount_input, base, select_input, submit_button, text_input},
    navigation::NavBar,
};

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The allowed categories and periods.
    pub config: Arc<AppConfig>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget creation page.
pub async fn get_new_budget_page(State(state): State<CreateBudgetState>) -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (new_budget_form(&state.config)) }
    };

    base("Create Budget", &[], &content).into_response()
}

fn new_budget_form(config: &AppConfig) -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (text_input("Name", "name", "text", "", true))
            (amount_input("Limit", "amount", None))
            (select_input("Category", "category", &config.categories, None, None))
            (select_input("Period", "period", &config.budget_periods, Some("monthly"), None))
            (text_input("Start Date", "start_date", "date", "", true))
            (text_input("End Date", "end_date", "date", "", true))
            (submit_button("Create Budget"))
        }
    }
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    user_id: UserID,
    Form(fields): Form<BudgetFields>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(user_id, fields, &state.config, &connection) {
        Ok(budget) => {
            tracing::debug!("User {user_id} created budget {}", budget.id);

            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::Validation(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod create_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        AppConfig, endpoints,
        budget::list_budgets,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{CreateBudgetState, create_budget_endpoint};

    fn get_server() -> (TestServer, CreateBudgetState, crate::UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let state = CreateBudgetState {
            config: Arc::new(AppConfig::default()),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
            .layer(Extension(user_id))
            .with_state(state.clone());

        (
            TestServer::new(app).expect("Could not create test server."),
            state,
            user_id,
        )
    }

    #[tokio::test]
    async fn can_create_budget() {
        let (server, state, user_id) = get_server();

        let response = server
            .post(endpoints::BUDGETS_API)
            .form(&[
                ("name", "Groceries"),
                ("amount", "400"),
                ("category", "food"),
                ("period", "monthly"),
                ("start_date", "2024-03-01"),
                ("end_date", "2024-03-31"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::BUDGETS_VIEW);
        let budgets = list_budgets(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, dec!(400));
        assert_eq!(budgets[0].end_date, date!(2024 - 03 - 31));
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let (server, state, user_id) = get_server();

        server
            .post(endpoints::BUDGETS_API)
            .form(&[
                ("name", "Groceries"),
                ("amount", "400"),
                ("category", "food"),
                ("period", "monthly"),
                ("start_date", "2024-03-31"),
                ("end_date", "2024-03-01"),
            ])
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let budgets = list_budgets(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(budgets.is_empty());
    }
}
