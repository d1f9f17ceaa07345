//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    advisor::get_advice_endpoint,
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint, get_goal_endpoint,
        list_goals_endpoint,
    },
    not_found::get_404_not_found,
    report::get_summary_report_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        export_transactions_endpoint, get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            get(export_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::GOALS_API,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint)
                .put(edit_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(endpoints::ADVISOR, post(get_advice_endpoint))
        .route(endpoints::SUMMARY_REPORT, get(get_summary_report_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, test_utils::get_test_server};

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let (server, _) = get_test_server();

        let response = server.get("/api/budgets").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn export_route_is_not_treated_as_an_id() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS_EXPORT)
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "Date,Description,Category,Type,Amount\n");
    }

    #[tokio::test]
    async fn created_transaction_is_listed() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({ "userId": "u1", "type": "expense", "amount": 42.50 }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["amount"], 42.5);
        assert_eq!(transactions[0]["type"], "expense");
    }

    #[tokio::test]
    async fn created_goal_can_be_read_back() {
        let (server, _) = get_test_server();

        let created: Value = server
            .post(endpoints::GOALS_API)
            .json(&json!({
                "userId": "u1",
                "name": "Car",
                "targetAmount": 8000,
                "currentAmount": 1000,
                "targetDate": "2027-01-01T00:00:00.000Z",
                "priority": "medium",
                "monthlyContribution": 300,
            }))
            .await
            .json();
        let id = created["goal"]["id"].as_i64().unwrap();

        let response = server
            .get(&endpoints::format_endpoint(endpoints::GOAL, id))
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "Car");
        assert_eq!(body["targetDate"], "2027-01-01");
        assert_eq!(body["priority"], "Medium");
    }
}
