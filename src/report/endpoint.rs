use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Deserialize;

use crate::{
    AppState, Error,
    date::parse_optional_date,
    goal::get_goals_for_user,
    report::aggregation::{Summary, summarise},
    request::query_params,
    transaction::{TransactionFilter, query_transactions},
    user::UserId,
};

/// The state needed to build a summary report.
#[derive(Debug, Clone)]
pub struct SummaryReportState {
    /// The database connection for reading goals and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string parameters for the summary report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// The user to summarise.
    pub user_id: Option<String>,
    /// Only include transactions on or after this date.
    pub date_from: Option<String>,
    /// Only include transactions on or before this date.
    pub date_to: Option<String>,
}

/// A route handler that summarises a user's transactions and goal progress.
pub async fn get_summary_report_endpoint(
    State(state): State<SummaryReportState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Summary>, Error> {
    let query = query_params(query)?;
    let filter = TransactionFilter {
        date_from: parse_optional_date(query.date_from.as_deref())?,
        date_to: parse_optional_date(query.date_to.as_deref())?,
        ..TransactionFilter::for_user(UserId::from_param(query.user_id.as_deref())?)
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let snapshot = SqlTransaction::new_unchecked(&connection, TransactionBehavior::Deferred)?;
    let transactions = query_transactions(&filter, None, &snapshot)?;
    let goals = get_goals_for_user(&filter.user_id, &snapshot)?;
    snapshot.commit()?;

    Ok(Json(summarise(&transactions, &goals)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        goal::Priority,
        test_utils::{get_test_server, insert_goal, insert_transaction},
        transaction::TransactionType,
    };

    #[tokio::test]
    async fn summarises_users_finances() {
        let (server, state) = get_test_server();
        insert_transaction(&state, "u1", TransactionType::Income, 2000.0, "Salary");
        insert_transaction(&state, "u1", TransactionType::Expense, 500.0, "Housing");
        insert_transaction(&state, "u1", TransactionType::Expense, 100.0, "Food");
        insert_transaction(&state, "u2", TransactionType::Expense, 999.0, "Housing");
        insert_goal(&state, "u1", "Holiday", Priority::Medium);

        let response = server
            .get(endpoints::SUMMARY_REPORT)
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalIncome"], 2000.0);
        assert_eq!(body["totalExpenses"], 600.0);
        assert_eq!(body["netSavings"], 1400.0);
        assert_eq!(body["savingsRate"], 70.0);
        assert_eq!(
            body["expensesByCategory"],
            json!([
                { "category": "Housing", "amount": 500.0 },
                { "category": "Food", "amount": 100.0 },
            ])
        );
        assert_eq!(body["monthly"].as_array().unwrap().len(), 1);
        assert_eq!(body["goals"][0]["name"], "Holiday");
        assert_eq!(body["goals"][0]["progressPercentage"], 25);
    }

    #[tokio::test]
    async fn date_range_excludes_other_transactions() {
        let (server, state) = get_test_server();
        insert_transaction(&state, "u1", TransactionType::Income, 2000.0, "Salary");

        let response = server
            .get(endpoints::SUMMARY_REPORT)
            .add_query_param("userId", "u1")
            .add_query_param("dateFrom", "1999-01-01")
            .add_query_param("dateTo", "1999-12-31")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalIncome"], 0.0);
        assert_eq!(body["monthly"], json!([]));
    }

    #[tokio::test]
    async fn bad_date_is_rejected() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::SUMMARY_REPORT)
            .add_query_param("userId", "u1")
            .add_query_param("dateFrom", "yesterday")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
