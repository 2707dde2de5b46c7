//! Goal creation page and endpoint.

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
    AppState, Error, UserID, endpoints,
    goal::{GoalFields, create_goal},
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, amount_input, base,
        submit_button, text_input,
    },
    navigation::NavBar,
};

/// The state needed for creating a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goal creation page.
pub async fn get_new_goal_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW).into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (new_goal_form()) }
    };

    base("Create Goal", &[], &content).into_response()
}

fn new_goal_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::GOALS_API)
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (text_input("Name", "name", "text", "", true))
            (amount_input("Target Amount", "target_amount", None))

            div
            {
                label for="current_amount" class=(FORM_LABEL_STYLE) { "Already Saved" }

                input
                    type="number"
                    name="current_amount"
                    id="current_amount"
                    step="0.01"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (text_input("Target Date", "target_date", "date", "", true))
            (submit_button("Create Goal"))
        }
    }
}

/// Handle goal creation form submission.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    user_id: UserID,
    Form(fields): Form<GoalFields>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(user_id, fields, &connection) {
        Ok(goal) => {
            tracing::debug!("User {user_id} created goal {}", goal.id);

            (
                HxRedirect(endpoints::GOALS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::Validation(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}
