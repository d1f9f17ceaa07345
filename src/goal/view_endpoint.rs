use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::GoalId,
    goal::{Goal, core::get_goal},
    request::query_params,
    user::UserQuery,
};

/// The state needed to get a single goal.
#[derive(Debug, Clone)]
pub struct ViewGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ViewGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with a single goal owned by the requesting user.
pub async fn get_goal_endpoint(
    State(state): State<ViewGoalState>,
    Path(goal_id): Path<GoalId>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Goal>, Error> {
    let user_id = query_params(query)?.user_id()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_goal(goal_id, &user_id, &connection).map(Json)
}
