//! Defines the endpoint for updating an existing savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    database_id::GoalId,
    date::parse_date,
    goal::{
        Goal,
        core::{get_goal, update_goal},
    },
    request::json_body,
    user::UserId,
};

/// The state needed to update a goal.
#[derive(Debug, Clone)]
pub struct EditGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields that may be changed on a goal. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditGoalRequest {
    /// The user that owns the goal.
    pub user_id: Option<String>,
    /// The new name.
    pub name: Option<String>,
    /// The new target amount.
    pub target_amount: Option<f64>,
    /// The new amount saved so far.
    pub current_amount: Option<f64>,
    /// The new target date.
    pub target_date: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new priority, in any case.
    pub priority: Option<String>,
    /// The new monthly contribution.
    pub monthly_contribution: Option<f64>,
}

impl EditGoalRequest {
    /// Override the fields of `goal` that are present in this request.
    fn apply_to(self, mut goal: Goal) -> Result<Goal, Error> {
        if let Some(name) = self.name {
            goal.name = name;
        }

        if let Some(target_amount) = self.target_amount {
            goal.target_amount = target_amount;
        }

        if let Some(current_amount) = self.current_amount {
            goal.current_amount = current_amount;
        }

        if let Some(target_date) = self.target_date {
            goal.target_date = parse_date(&target_date)?;
        }

        if let Some(description) = self.description {
            goal.description = description;
        }

        if let Some(priority) = self.priority {
            goal.priority = priority.parse()?;
        }

        if let Some(monthly_contribution) = self.monthly_contribution {
            goal.monthly_contribution = monthly_contribution;
        }

        Ok(goal)
    }
}

/// A route handler for updating a goal owned by the requesting user.
pub async fn edit_goal_endpoint(
    State(state): State<EditGoalState>,
    Path(goal_id): Path<GoalId>,
    payload: Result<Json<EditGoalRequest>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let request = json_body(payload)?;
    let user_id = UserId::from_param(request.user_id.as_deref())?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = get_goal(goal_id, &user_id, &connection)?;
    let goal = request.apply_to(goal)?;
    let goal = update_goal(&goal, &connection)?;

    Ok(Json(json!({
        "message": "Goal updated successfully",
        "goal": goal,
    })))
}
