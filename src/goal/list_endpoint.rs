//! Defines the endpoint for listing a page of a user's goals.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Serialize;

use crate::{
    AppState, Error,
    filter::with_all_facet,
    goal::{
        Goal,
        query::{GoalFilter, GoalQueryParams, count_matching_goals, get_priorities, query_goals},
    },
    pagination::{PageInfo, PageRequest, PaginationConfig},
    request::query_params,
};

/// The state needed to list goals.
#[derive(Debug, Clone)]
pub struct ListGoalsState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListGoalsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A page of goals with the paging metadata and priority facets.
#[derive(Debug, Serialize)]
pub struct GoalPage {
    /// The goals on the requested page.
    pub goals: Vec<Goal>,
    /// Paging metadata.
    #[serde(flatten)]
    pub page_info: PageInfo,
    /// "all" followed by every priority the user has used, most important first.
    pub priorities: Vec<String>,
}

/// A route handler for listing a filtered, sorted page of a user's goals.
pub async fn list_goals_endpoint(
    State(state): State<ListGoalsState>,
    query: Result<Query<GoalQueryParams>, QueryRejection>,
) -> Result<Json<GoalPage>, Error> {
    let params = query_params(query)?;
    let filter = GoalFilter::from_params(&params)?;
    let page_request = PageRequest::new(
        params.page,
        params.limit,
        state.pagination_config.default_goals_per_page,
        &state.pagination_config,
    )?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_goal_page(&filter, &page_request, &connection).map(Json)
}

fn get_goal_page(
    filter: &GoalFilter,
    page_request: &PageRequest,
    connection: &Connection,
) -> Result<GoalPage, Error> {
    let snapshot = SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let goals = query_goals(filter, Some(page_request), &snapshot)?;
    let total_count = count_matching_goals(filter, &snapshot)?;
    let priorities = get_priorities(&filter.user_id, &snapshot)?
        .into_iter()
        .map(|priority| priority.to_string())
        .collect();

    snapshot.commit()?;

    Ok(GoalPage {
        page_info: PageInfo::new(page_request, goals.len(), total_count),
        goals,
        priorities: with_all_facet(priorities),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        goal::Priority,
        test_utils::{get_test_server, insert_goal},
    };

    #[tokio::test]
    async fn lists_goals_with_priority_facets() {
        let (server, state) = get_test_server();
        insert_goal(&state, "u1", "Bike", Priority::Low);
        insert_goal(&state, "u1", "Emergency fund", Priority::High);
        insert_goal(&state, "u2", "Boat", Priority::Medium);

        let response = server
            .get(endpoints::GOALS_API)
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["goals"].as_array().unwrap().len(), 2);
        assert_eq!(body["totalCount"], 2);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["priorities"], json!(["all", "High", "Low"]));
    }

    #[tokio::test]
    async fn filters_by_priority_in_any_case() {
        let (server, state) = get_test_server();
        insert_goal(&state, "u1", "Bike", Priority::Low);
        insert_goal(&state, "u1", "Emergency fund", Priority::High);

        let response = server
            .get(endpoints::GOALS_API)
            .add_query_param("userId", "u1")
            .add_query_param("priority", "high")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let goals = body["goals"].as_array().unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0]["name"], "Emergency fund");
    }

    #[tokio::test]
    async fn default_page_size_applies() {
        let (server, state) = get_test_server();
        for i in 0..25 {
            insert_goal(&state, "u1", &format!("Goal {i}"), Priority::Medium);
        }

        let response = server
            .get(endpoints::GOALS_API)
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["goals"].as_array().unwrap().len(), 20);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["hasMore"], true);
    }

    #[tokio::test]
    async fn unknown_priority_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::GOALS_API)
            .add_query_param("userId", "u1")
            .add_query_param("priority", "urgent")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
