//! The JSON summary of a user's spending consumed by the reports page charts.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

use crate::{
    AppState, Error, UserID,
    report::aggregation::{MonthlyFlow, expense_by_category, monthly_flow},
};

/// An amount as it appears in the report JSON.
///
/// Zero is written as the integer `0`, anything else as a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportAmount(pub Decimal);

impl ReportAmount {
    /// The amount as a float, or NaN if it cannot be converted.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_else(|| {
            tracing::warn!("Could not convert {} to a float", self.0);
            f64::NAN
        })
    }
}

impl Serialize for ReportAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.is_zero() {
            serializer.serialize_i64(0)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

/// Expense totals as parallel arrays of category names and amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpenses {
    pub categories: Vec<String>,
    pub data: Vec<ReportAmount>,
}

impl From<BTreeMap<String, Decimal>> for CategoryExpenses {
    fn from(totals: BTreeMap<String, Decimal>) -> Self {
        let (categories, data) = totals
            .into_iter()
            .map(|(category, total)| (category, ReportAmount(total)))
            .unzip();

        Self { categories, data }
    }
}

/// Monthly totals as parallel arrays of "YYYY-MM" labels, income and expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyData {
    pub months: Vec<String>,
    pub income: Vec<ReportAmount>,
    pub expense: Vec<ReportAmount>,
}

impl From<Vec<MonthlyFlow>> for MonthlyData {
    fn from(flows: Vec<MonthlyFlow>) -> Self {
        let mut data = MonthlyData {
            months: Vec::with_capacity(flows.len()),
            income: Vec::with_capacity(flows.len()),
            expense: Vec::with_capacity(flows.len()),
        };

        for flow in flows {
            data.months.push(flow.month.label());
            data.income.push(ReportAmount(flow.income));
            data.expense.push(ReportAmount(flow.expense));
        }

        data
    }
}

/// Everything the reports page plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub expense_by_category: CategoryExpenses,
    pub monthly_data: MonthlyData,
}

impl ReportData {
    /// Aggregate the user's transactions.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if the transactions cannot be read.
    pub fn for_user(user_id: UserID, connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            expense_by_category: expense_by_category(user_id, connection)?.into(),
            monthly_data: monthly_flow(user_id, connection)?.into(),
        })
    }
}

/// The state needed for the report data endpoint.
#[derive(Debug, Clone)]
pub struct ReportDataState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportDataState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with the user's [ReportData] as JSON.
pub async fn get_report_data(
    State(state): State<ReportDataState>,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let report = ReportData::for_user(user_id, &connection).inspect_err(|error| {
        tracing::error!("Failed to build report for user {user_id}: {error}")
    })?;

    Ok(Json(report).into_response())
}
