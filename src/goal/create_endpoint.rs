//! Defines the endpoint for creating a new savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    date::parse_date,
    goal::{NewGoal, Priority, core::create_goal},
    request::{RequiredFields, json_body},
    user::UserId,
};

/// The state needed to create a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a goal.
///
/// Every field is optional here so that missing fields can be reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    /// The user that will own the goal.
    pub user_id: Option<String>,
    /// A short name for the goal.
    pub name: Option<String>,
    /// How much the user wants to have saved.
    pub target_amount: Option<f64>,
    /// How much the user has saved so far.
    pub current_amount: Option<f64>,
    /// When the user wants to reach the target.
    pub target_date: Option<String>,
    /// "High", "Medium" or "Low" in any case.
    pub priority: Option<String>,
    /// How much the user plans to save each month.
    pub monthly_contribution: Option<f64>,
    /// Defaults to an empty string.
    pub description: Option<String>,
}

impl CreateGoalRequest {
    fn into_new_goal(self) -> Result<NewGoal, Error> {
        RequiredFields::new()
            .text("userId", &self.user_id)
            .text("name", &self.name)
            .value("targetAmount", &self.target_amount)
            .value("currentAmount", &self.current_amount)
            .text("targetDate", &self.target_date)
            .text("priority", &self.priority)
            .value("monthlyContribution", &self.monthly_contribution)
            .check()?;

        let priority: Priority = self.priority.as_deref().unwrap_or_default().parse()?;

        Ok(NewGoal {
            user_id: UserId::from_param(self.user_id.as_deref())?,
            name: self.name.unwrap_or_default(),
            target_amount: self.target_amount.unwrap_or_default(),
            current_amount: self.current_amount.unwrap_or_default(),
            target_date: parse_date(self.target_date.as_deref().unwrap_or_default())?,
            description: self.description.unwrap_or_default(),
            priority,
            monthly_contribution: self.monthly_contribution.unwrap_or_default(),
        })
    }
}

/// A route handler for creating a new goal.
///
/// Responds with 201 and the stored goal.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    payload: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let new_goal = json_body(payload)?.into_new_goal()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = create_goal(new_goal, &connection)
        .inspect_err(|error| tracing::error!("could not create goal: {error}"))?;

    tracing::info!("Created goal {} for user {}", goal.id, goal.user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Goal added successfully",
            "goal": goal,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, goal_count},
    };

    fn goal_body() -> Value {
        json!({
            "userId": "u1",
            "name": "Emergency fund",
            "targetAmount": 5000,
            "currentAmount": 0,
            "targetDate": "2026-12-31",
            "priority": "high",
            "monthlyContribution": 250,
        })
    }

    #[tokio::test]
    async fn can_create_goal() {
        let (server, state) = get_test_server();

        let response = server.post(endpoints::GOALS_API).json(&goal_body()).await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Goal added successfully");
        assert_eq!(body["goal"]["name"], "Emergency fund");
        assert_eq!(body["goal"]["priority"], "High");
        assert_eq!(body["goal"]["targetDate"], "2026-12-31");
        assert_eq!(body["goal"]["currentAmount"], 0.0);
        assert_eq!(body["goal"]["description"], "");
        assert_eq!(goal_count(&state), 1);
    }

    #[tokio::test]
    async fn missing_target_amount_is_rejected() {
        let (server, state) = get_test_server();
        let mut body = goal_body();
        body.as_object_mut().unwrap().remove("targetAmount");

        let response = server.post(endpoints::GOALS_API).json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Missing required fields: targetAmount are required."
        );
        assert_eq!(goal_count(&state), 0);
    }

    #[tokio::test]
    async fn invalid_priority_is_rejected() {
        let (server, state) = get_test_server();
        let mut body = goal_body();
        body["priority"] = json!("urgent");

        let response = server.post(endpoints::GOALS_API).json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(goal_count(&state), 0);
    }

    #[tokio::test]
    async fn invalid_target_date_is_rejected() {
        let (server, state) = get_test_server();
        let mut body = goal_body();
        body["targetDate"] = json!("next year");

        let response = server.post(endpoints::GOALS_API).json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(goal_count(&state), 0);
    }
}
