//! Defines the route handler for the page that lists transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppConfig, AppState, Error, UserID, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, delete_button, format_currency, select_input,
    },
    navigation::NavBar,
    pagination::{Page, create_pagination_indicators, pagination_nav},
    transaction::{Transaction, TransactionFilter, TransactionType, list_transactions},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// Categories and page sizes.
    pub config: Arc<AppConfig>,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The filters and page selected in the URL query.
///
/// Empty values, e.g. from the "All" options in the filter form, mean no filter.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsQuery {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<TransactionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
}

impl TransactionsQuery {
    fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            type_: self.type_,
            category: self.category.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// The URL of `page` with the same filters.
    fn page_url(&self, page: u64) -> String {
        let query = Self {
            page: Some(page),
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::TRANSACTIONS_VIEW),
            Err(error) => {
                tracing::error!("could not encode transactions query {query:?}: {error}");
                endpoints::TRANSACTIONS_VIEW.to_owned()
            }
        }
    }
}

/// Render a page of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    user_id: UserID,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let pagination = &state.config.pagination;
    let page = query.page.unwrap_or(pagination.default_page);
    let page_size = query.per_page.unwrap_or(pagination.default_page_size);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(user_id, &query.filter(), page, page_size, &connection)
        .inspect_err(|error| match error {
            Error::Validation(_) => {}
            error => tracing::error!("could not list transactions: {error}"),
        })?;

    Ok(transactions_view(&transactions, &query, &state.config).into_response())
}

fn filter_form(query: &TransactionsQuery, categories: &[String]) -> Markup {
    let selected_type = query.type_.map(|type_| type_.as_str());

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-1 gap-4 md:grid-cols-5 items-end"
        {
            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_type.is_none()] { "All types" }
                    option value="income" selected[selected_type == Some("income")] { "Income" }
                    option value="expense" selected[selected_type == Some("expense")] { "Expense" }
                }
            }

            (select_input("Category", "category", categories, query.category.as_deref(), Some("All categories")))

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    type="date"
                    name="start_date"
                    id="start_date"
                    value=[query.start_date.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    type="date"
                    name="end_date"
                    id="end_date"
                    value=[query.end_date.map(|date| date.to_string())]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let amount_style = match transaction.type_ {
        TransactionType::Income => "text-green-600 dark:text-green-400",
        TransactionType::Expense => "text-red-600 dark:text-red-400",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date.to_string()) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class={ (TABLE_CELL_STYLE) " text-right " (amount_style) }
            {
                (format_currency(transaction.signed_amount()))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                    (delete_button(&delete_url, "Are you sure you want to delete this transaction?"))
                }
            }
        }
    }
}

fn transactions_view(
    transactions: &Page<Transaction>,
    query: &TransactionsQuery,
    config: &AppConfig,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let indicators = create_pagination_indicators(
        transactions.page,
        transactions.page_count(),
        config.pagination.max_pages,
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Record Transaction" }
                }

                (filter_form(query, &config.categories))

                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &transactions.items {
                                (transaction_row(transaction))
                            }

                            @if transactions.items.is_empty() {
                                tr
                                {
                                    td colspan="5" class="px-6 py-4 text-center"
                                    {
                                        "No transactions found."
                                    }
                                }
                            }
                        }
                    }
                }

                p class="text-sm text-center"
                {
                    (transactions.total) " transactions"
                }

                (pagination_nav(&indicators, |page| query.page_url(page)))
            }
        }
    };

    base("Transactions", &[], &content)
}
