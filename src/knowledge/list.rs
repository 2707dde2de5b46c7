//! The page for browsing knowledge articles.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppConfig, AppState, Error, UserID, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, select_input,
    },
    knowledge::{
        Article, list_article_categories, list_articles, list_favorite_articles,
    },
    navigation::NavBar,
    pagination::{Page, create_pagination_indicators, pagination_nav},
};

/// The state needed for the knowledge page.
#[derive(Debug, Clone)]
pub struct KnowledgePageState {
    /// Page sizes.
    pub config: Arc<AppConfig>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for KnowledgePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            config: state.config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The category filter and page in the URL query.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl KnowledgeQuery {
    fn page_url(&self, page: u64) -> String {
        let query = Self {
            page: Some(page),
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::KNOWLEDGE_VIEW),
            Err(error) => {
                tracing::error!("could not encode knowledge query {query:?}: {error}");
                endpoints::KNOWLEDGE_VIEW.to_owned()
            }
        }
    }
}

/// Render a page of articles, newest first, along with the user's favorites.
pub async fn get_knowledge_page(
    State(state): State<KnowledgePageState>,
    user_id: UserID,
    Query(query): Query<KnowledgeQuery>,
) -> Result<Response, Error> {
    let pagination = &state.config.pagination;
    let page = query.page.unwrap_or(pagination.default_page);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let articles = list_articles(
        query.category.as_deref(),
        page,
        pagination.default_page_size,
        &connection,
    )?;
    let categories = list_article_categories(&connection)?;
    let favorites = list_favorite_articles(user_id, &connection)?;

    Ok(knowledge_view(&articles, &favorites, &categories, &query, &state.config).into_response())
}

/// A card with the article's title, category and summary.
pub fn article_card(article: &Article) -> Markup {
    let url = endpoints::format_endpoint(endpoints::ARTICLE_VIEW, article.id);

    html! {
        article class=(CARD_STYLE)
        {
            header class="flex justify-between items-center gap-2 mb-2"
            {
                h3 class="text-lg font-semibold"
                {
                    a href=(url) class=(LINK_STYLE) { (article.title) }
                }

                span class=(CATEGORY_BADGE_STYLE) { (article.category) }
            }

            p class="text-sm text-gray-600 dark:text-gray-300" { (article.summary) }
        }
    }
}

fn knowledge_view(
    articles: &Page<Article>,
    favorites: &[Article],
    categories: &[String],
    query: &KnowledgeQuery,
    config: &AppConfig,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::KNOWLEDGE_VIEW).into_html();
    let indicators = create_pagination_indicators(
        articles.page,
        articles.page_count(),
        config.pagination.max_pages,
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Knowledge" }

                form
                    method="get"
                    action=(endpoints::KNOWLEDGE_VIEW)
                    class="flex gap-4 items-end"
                {
                    div class="flex-1"
                    {
                        (select_input("Category", "category", categories, query.category.as_deref(), Some("All categories")))
                    }

                    div { button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" } }
                }

                div id="articles" class="grid grid-cols-1 gap-4 md:grid-cols-2"
                {
                    @for article in &articles.items {
                        (article_card(article))
                    }
                }

                @if articles.items.is_empty() {
                    p class="text-center" { "No articles found." }
                }

                (pagination_nav(&indicators, |page| query.page_url(page)))
            }

            @if !favorites.is_empty() {
                section id="favorites" class="w-full space-y-4 lg:max-w-5xl mt-8"
                {
                    h2 class="text-lg font-bold" { "Your Favorites" }

                    ul class="list-disc list-inside"
                    {
                        @for article in favorites {
                            li
                            {
                                a
                                    href=(endpoints::format_endpoint(endpoints::ARTICLE_VIEW, article.id))
                                    class=(LINK_STYLE)
                                {
                                    (article.title)
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Knowledge", &[], &content)
}
