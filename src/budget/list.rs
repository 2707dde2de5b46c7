//! Budgets listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    AppState, Error, UserID,
    budget::{Budget, budget_spending, list_budgets},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_button, format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the budgets listing page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A budget and how much has been spent against it.
pub struct BudgetProgress {
    pub budget: Budget,
    pub spent: Decimal,
}

impl BudgetProgress {
    /// Pair each budget with its spending so far.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if a query fails or [Error::Validation] if
    /// a total is too large.
    pub fn for_budgets(
        budgets: Vec<Budget>,
        connection: &Connection,
    ) -> Result<Vec<BudgetProgress>, Error> {
        budgets
            .into_iter()
            .map(|budget| {
                let spent = budget_spending(&budget, connection)?;
                Ok(BudgetProgress { budget, spent })
            })
            .collect()
    }

    fn is_over(&self) -> bool {
        self.spent > self.budget.amount
    }
}

/// Render all of the user's budgets, latest start date first.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = list_budgets(user_id, &connection)
        .and_then(|budgets| BudgetProgress::for_budgets(budgets, &connection))
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;

    Ok(budgets_view(&budgets, today).into_response())
}

/// The amount spent against the limit, highlighted when over budget.
pub fn budget_spending_summary(progress: &BudgetProgress) -> Markup {
    let style = if progress.is_over() {
        "text-red-600 dark:text-red-400 font-semibold"
    } else {
        "text-gray-900 dark:text-white"
    };

    html! {
        span class=(style)
        {
            (format_currency(progress.spent)) " of " (format_currency(progress.budget.amount))
        }
    }
}

fn budgets_view(budgets: &[BudgetProgress], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let table_row = |progress: &BudgetProgress| {
        let budget = &progress.budget;
        let delete_url = endpoints::format_endpoint(endpoints::BUDGET, budget.id);
        let confirm_message = format!("Are you sure you want to delete '{}'?", budget.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (budget.name) }
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (budget.category) }
                }
                td class=(TABLE_CELL_STYLE) { (budget.period) }
                td class=(TABLE_CELL_STYLE) { (budget_spending_summary(progress)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (budget.start_date.to_string()) " to " (budget.end_date.to_string())

                    @if budget.is_active(today) {
                        " (active)"
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
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Create Budget" }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Dates" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for progress in budgets {
                                (table_row(progress))
                            }

                            @if budgets.is_empty() {
                                tr
                                {
                                    td colspan="6" class="px-6 py-4 text-center"
                                    {
                                        "No budgets yet. "
                                        a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                                        {
                                            "Create your first budget"
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

    base("Budgets", &[], &content)
}

#[cfg(test)]
mod budgets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        AppConfig,
        budget::{BudgetFields, create_budget},
        test_utils::{
            assert_status_ok, assert_valid_html, create_test_user, get_test_connection,
            parse_html_document,
        },
        transaction::{TransactionFields, TransactionType, record_transaction},
    };

    use super::{BudgetsPageState, get_budgets_page};

    #[tokio::test]
    async fn budgets_page_shows_spending() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let config = AppConfig::default();
        create_budget(
            alice,
            BudgetFields {
                name: "Groceries".to_owned(),
                amount: dec!(100),
                category: "food".to_owned(),
                period: "monthly".to_owned(),
                start_date: date!(2024 - 03 - 01),
                end_date: date!(2024 - 03 - 31),
            },
            &config,
            &connection,
        )
        .unwrap();
        record_transaction(
            alice,
            TransactionFields {
                amount: dec!(120),
                type_: TransactionType::Expense,
                category: "food".to_owned(),
                description: String::new(),
                date: date!(2024 - 03 - 10),
            },
            None,
            &config,
            &connection,
        )
        .unwrap();
        let state = BudgetsPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_page(State(state), alice).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let spent = html
            .select(&Selector::parse("tbody tr td:nth-child(4) span").unwrap())
            .map(|cell| {
                (
                    cell.text().collect::<String>(),
                    cell.value().attr("class").unwrap_or_default().to_owned(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(spent.len(), 1);
        assert_eq!(spent[0].0, "$120.00 of $100.00");
        assert!(spent[0].1.contains("text-red-600"));
    }

    #[tokio::test]
    async fn budgets_page_shows_empty_state() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let state = BudgetsPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_budgets_page(State(state), alice).await.unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No budgets yet."));
    }
}
