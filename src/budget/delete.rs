//! Budget deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, alert::Alert, budget::delete_budget, database_id::BudgetID,
};

/// The state needed for deleting a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle budget deletion. Returns success alert or error.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetID>,
    State(state): State<DeleteBudgetState>,
    user_id: UserID,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(user_id, budget_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Budget deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::NotFound | Error::PermissionDenied)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        AppConfig, Error,
        budget::{BudgetFields, create_budget, get_budget},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{DeleteBudgetState, delete_budget_endpoint};

    #[tokio::test]
    async fn only_owner_can_delete_budget() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let budget = create_budget(
            alice,
            BudgetFields {
                name: "Fun".to_owned(),
                amount: dec!(50),
                category: "entertainment".to_owned(),
                period: "weekly".to_owned(),
                start_date: date!(2024 - 03 - 04),
                end_date: date!(2024 - 03 - 10),
            },
            &AppConfig::default(),
            &connection,
        )
        .unwrap();
        let state = DeleteBudgetState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_budget_endpoint(Path(budget.id), State(state.clone()), bob).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = delete_budget_endpoint(Path(budget.id), State(state.clone()), alice).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_budget(budget.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }
}
