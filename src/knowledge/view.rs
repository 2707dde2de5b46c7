//! The page for reading an article and the endpoint for adding it to favorites.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    database_id::ArticleID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    knowledge::{Article, FavoriteOutcome, favorite_article, get_article, is_favorite},
    navigation::NavBar,
};

/// The state needed to view and favorite articles.
#[derive(Debug, Clone)]
pub struct ArticleState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ArticleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn favorite_button(article_id: ArticleID, is_favorite: bool) -> Markup {
    let endpoint = endpoints::format_endpoint(endpoints::FAVORITE_ARTICLE, article_id);

    html! {
        @if is_favorite {
            button id="favorite-button" type="button" disabled class=(BUTTON_PRIMARY_STYLE)
            {
                "In your favorites"
            }
        } @else {
            button
                id="favorite-button"
                type="button"
                hx-post=(endpoint)
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Add to favorites"
            }
        }
    }
}

fn article_view(article: &Article, is_favorite: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::KNOWLEDGE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            article class="w-full space-y-4 lg:max-w-3xl"
            {
                a href=(endpoints::KNOWLEDGE_VIEW) class=(LINK_STYLE) { "Back to articles" }

                h1 class="text-2xl font-bold" { (article.title) }

                p class="flex gap-2 items-center text-sm text-gray-500 dark:text-gray-400"
                {
                    span class=(CATEGORY_BADGE_STYLE) { (article.category) }
                    (article.created_at.date().to_string())
                }

                p class="italic" { (article.summary) }

                @for paragraph in article.content.split("\n\n") {
                    p { (paragraph) }
                }

                div class="max-w-xs" { (favorite_button(article.id, is_favorite)) }
            }
        }
    };

    base(&article.title, &[], &content)
}

/// Render an article with a button to add it to the user's favorites.
pub async fn get_article_page(
    Path(article_id): Path<ArticleID>,
    State(state): State<ArticleState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let article = get_article(article_id, &connection)?;
    let favorited = is_favorite(user_id, article_id, &connection)?;

    Ok(article_view(&article, favorited).into_response())
}

/// Add an article to the user's favorites.
///
/// Responds with the updated favorite button and an alert saying whether
/// anything changed.
pub async fn favorite_article_endpoint(
    Path(article_id): Path<ArticleID>,
    State(state): State<ArticleState>,
    user_id: UserID,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let alert = match favorite_article(user_id, article_id, &connection) {
        Ok(FavoriteOutcome::Added) => Alert::SuccessSimple {
            message: "Added to your favorites".to_owned(),
        },
        Ok(FavoriteOutcome::AlreadyFavorited) => Alert::Info {
            message: "Already in your favorites".to_owned(),
        },
        Err(error @ Error::NotFound) => return error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not favorite article {article_id}: {error}");
            return error.into_alert_response();
        }
    };

    let markup = html! {
        (favorite_button(article_id, true))
        (alert.into_html())
    };

    Html(markup.into_string()).into_response()
}
