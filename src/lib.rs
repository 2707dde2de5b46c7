//! Pocket Ledger is a web app for tracking personal finances.
//!
//! Users log income and expenses, set budgets and savings goals, browse a
//! small library of financial articles, and view simple reports. This
//! library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod amount;
mod app_state;
mod auth;
mod budget;
mod config;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod goal;
mod html;
mod internal_server_error;
mod knowledge;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use budget::{BudgetFields, create_budget};
pub use config::AppConfig;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use goal::{GoalFields, create_goal};
pub use knowledge::{NewArticle, create_article};
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::{TransactionFields, TransactionType, record_transaction};
pub use user::{
    Email, NewUser, User, UserID, Username, create_user, get_user_by_username, update_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
