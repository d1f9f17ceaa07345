use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, database_id::GoalId, goal::core::delete_goal, request::query_params,
    user::UserQuery,
};

/// The state needed to delete a goal.
#[derive(Debug, Clone)]
pub struct DeleteGoalState {
    /// The database connection for managing goals.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a goal owned by the requesting user.
pub async fn delete_goal_endpoint(
    State(state): State<DeleteGoalState>,
    Path(goal_id): Path<GoalId>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Value>, Error> {
    let user_id = query_params(query)?.user_id()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_goal(goal_id, &user_id, &connection)?;
    tracing::info!("Deleted goal {goal_id} for user {user_id}");

    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::Priority,
        test_utils::{get_test_server, goal_count, insert_goal},
    };

    #[tokio::test]
    async fn deletes_goal() {
        let (server, state) = get_test_server();
        let goal = insert_goal(&state, "u1", "Holiday", Priority::Low);

        let response = server
            .delete(&format_endpoint(endpoints::GOAL, goal.id))
            .add_query_param("userId", "u1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Goal deleted successfully");
        assert_eq!(goal_count(&state), 0);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_goal() {
        let (server, state) = get_test_server();
        let goal = insert_goal(&state, "u2", "Holiday", Priority::Low);

        let response = server
            .delete(&format_endpoint(endpoints::GOAL, goal.id))
            .add_query_param("userId", "u1")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(goal_count(&state), 1);
    }

    #[tokio::test]
    async fn requires_user_id() {
        let (server, state) = get_test_server();
        let goal = insert_goal(&state, "u1", "Holiday", Priority::Low);

        let response = server
            .delete(&format_endpoint(endpoints::GOAL, goal.id))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(goal_count(&state), 1);
    }
}
