//! The dashboard: a summary of recent activity, active budgets and goals, and some reading.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{BudgetProgress, budget_spending_summary, list_active_budgets},
    endpoints,
    goal::{Goal, goal_progress_bar, list_active_goals},
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    knowledge::{Article, article_card, get_all_articles, recommend_articles},
    navigation::NavBar,
    timezone::local_today,
    transaction::{Transaction, TransactionType, recent_transactions},
};

const RECENT_TRANSACTION_COUNT: u64 = 5;
const RECOMMENDED_ARTICLE_COUNT: usize = 3;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

struct DashboardData {
    transactions: Vec<Transaction>,
    budgets: Vec<BudgetProgress>,
    goals: Vec<Goal>,
    articles: Vec<Article>,
}

/// Display the user's latest transactions, active budgets and goals, and a
/// few randomly chosen articles.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(user_id, today, &connection)
        .inspect_err(|error| tracing::error!("Failed to load dashboard: {error}"))?;

    Ok(dashboard_view(&data).into_response())
}

fn build_dashboard_data(
    user_id: UserID,
    today: time::Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let transactions = recent_transactions(user_id, RECENT_TRANSACTION_COUNT, connection)?;
    let budgets = list_active_budgets(user_id, today, connection)
        .and_then(|budgets| BudgetProgress::for_budgets(budgets, connection))?;
    let goals = list_active_goals(user_id, today, connection)?;
    let articles = recommend_articles(
        &get_all_articles(connection)?,
        RECOMMENDED_ARTICLE_COUNT,
        &mut rand::thread_rng(),
    );

    Ok(DashboardData {
        transactions,
        budgets,
        goals,
        articles,
    })
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl grid grid-cols-1 lg:grid-cols-2 gap-6"
            {
                section id="recent-transactions" class="lg:col-span-2"
                {
                    (section_heading("Recent transactions", endpoints::TRANSACTIONS_VIEW))
                    (recent_transactions_table(&data.transactions))
                }

                section id="active-budgets"
                {
                    (section_heading("Active budgets", endpoints::BUDGETS_VIEW))

                    @if data.budgets.is_empty() {
                        p class="text-gray-500 dark:text-gray-400"
                        {
                            "No active budgets. " (link(endpoints::NEW_BUDGET_VIEW, "Create one"))
                        }
                    }

                    ul class="flex flex-col gap-3"
                    {
                        @for progress in &data.budgets {
                            li class=(CARD_STYLE)
                            {
                                div class="flex justify-between gap-2"
                                {
                                    span class="font-semibold" { (progress.budget.name) }
                                    span class=(CATEGORY_BADGE_STYLE) { (progress.budget.category) }
                                }
                                (budget_spending_summary(progress))
                            }
                        }
                    }
                }

                section id="active-goals"
                {
                    (section_heading("Active goals", endpoints::GOALS_VIEW))

                    @if data.goals.is_empty() {
                        p class="text-gray-500 dark:text-gray-400"
                        {
                            "No active goals. " (link(endpoints::NEW_GOAL_VIEW, "Set one"))
                        }
                    }

                    ul class="flex flex-col gap-3"
                    {
                        @for goal in &data.goals {
                            li class=(CARD_STYLE)
                            {
                                div class="flex justify-between gap-2 mb-2"
                                {
                                    span class="font-semibold" { (goal.name) }
                                    span
                                    {
                                        (format_currency(goal.current_amount))
                                        " of "
                                        (format_currency(goal.target_amount))
                                    }
                                }
                                (goal_progress_bar(goal))
                            }
                        }
                    }
                }

                section id="recommended-articles" class="lg:col-span-2"
                {
                    (section_heading("Recommended reading", endpoints::KNOWLEDGE_VIEW))

                    div class="grid grid-cols-1 md:grid-cols-3 gap-4"
                    {
                        @for article in &data.articles {
                            (article_card(article))
                        }
                    }
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn section_heading(title: &str, see_all_url: &str) -> Markup {
    html! {
        div class="flex justify-between items-baseline mb-3"
        {
            h2 class="text-xl font-bold" { (title) }
            (link(see_all_url, "See all"))
        }
    }
}

fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
    if transactions.is_empty() {
        return html! {
            p class="text-gray-500 dark:text-gray-400"
            {
                "Nothing recorded yet. "
                (link(endpoints::NEW_TRANSACTION_VIEW, "Record a transaction"))
            }
        };
    }

    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.date) }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                            }
                            td class={ (TABLE_CELL_STYLE) " " (amount_style(transaction.type_)) }
                            {
                                (format_currency(transaction.signed_amount()))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn amount_style(type_: TransactionType) -> &'static str {
    match type_ {
        TransactionType::Income => "text-green-600 dark:text-green-400",
        TransactionType::Expense => "text-red-600 dark:text-red-400",
    }
}
