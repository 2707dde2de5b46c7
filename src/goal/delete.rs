//! Goal deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    database_id::GoalID,
    goal::delete_goal,
};

/// The state needed for deleting a goal.
#[derive(Debug, Clone)]
pub struct DeleteGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle goal deletion. Returns success alert or error.
pub async fn delete_goal_endpoint(
    Path(goal_id): Path<GoalID>,
    State(state): State<DeleteGoalState>,
    user_id: UserID,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(user_id, goal_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Goal deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::NotFound | Error::PermissionDenied)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}
