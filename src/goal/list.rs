//! Goals listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, UserID, endpoints,
    goal::{Goal, list_goals},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, delete_button, format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the goals listing page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render all of the user's goals, soonest target date first.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = list_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    Ok(goals_view(&goals, today).into_response())
}

/// A progress bar filled to the goal's saved percentage.
pub fn goal_progress_bar(goal: &Goal) -> Markup {
    let percent = goal.progress_percent();

    html! {
        div class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
            title={ (percent.to_string()) "%" }
        {
            div class="h-2.5 bg-blue-600 rounded-full" style={ "width: " (percent.to_string()) "%" } {}
        }
    }
}

fn goals_view(goals: &[Goal], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let table_row = |goal: &Goal| {
        let delete_url = endpoints::format_endpoint(endpoints::GOAL, goal.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Transactions recorded against it are kept.",
            goal.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (goal.name) }
                td class=(TABLE_CELL_STYLE) { (format_currency(goal.current_amount)) }
                td class=(TABLE_CELL_STYLE) { (format_currency(goal.target_amount)) }
                td class=(TABLE_CELL_STYLE) { (goal_progress_bar(goal)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (goal.target_date.to_string())

                    @if !goal.is_active(today) {
                        " (past)"
                    }
                }
                td class=(TABLE_CELL_STYLE) { (delete_button(&delete_url, &confirm_message)) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Goals" }

                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create Goal" }
                }

                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Saved" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Target" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Target Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for goal in goals {
                                (table_row(goal))
                            }

                            @if goals.is_empty() {
                                tr
                                {
                                    td colspan="6" class="px-6 py-4 text-center"
                                    {
                                        "No goals yet. "
                                        a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE)
                                        {
                                            "Create your first goal"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Goals", &[], &content)
}
