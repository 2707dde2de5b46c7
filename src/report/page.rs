//! The reports page with charts of spending by category and month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    report::{
        charts::{
            ReportChart, category_expenses_chart, charts_script, charts_view, monthly_flow_chart,
        },
        data::ReportData,
    },
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the reports page for the logged in user.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let report = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        ReportData::for_user(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to build report: {error}"))?
    };

    if report.monthly_data.months.is_empty() {
        return Ok(reports_no_data_view().into_response());
    }

    let charts = [
        ReportChart {
            id: "category-expenses-chart",
            options: category_expenses_chart(&report.expense_by_category).to_string(),
        },
        ReportChart {
            id: "monthly-flow-chart",
            options: monthly_flow_chart(&report.monthly_data).to_string(),
        },
    ];

    Ok(reports_view(&charts).into_response())
}

fn reports_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "record a transaction");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "Charts will show up here once you " (new_transaction_link) "."
            }
        }
    );

    base("Reports", &[], &content)
}

fn reports_view(charts: &[ReportChart]) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Reports" }

            (charts_view(charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Reports", &scripts, &content)
}
