use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    advisor::{Advisor, AdvisorConfig, AdvisorPrompt},
    goal::get_goals_for_user,
    request::{RequiredFields, json_body},
    transaction::get_recent_transactions,
    user::UserId,
};

/// The state needed to ask the advisor for advice.
#[derive(Debug, Clone)]
pub struct AdvisorState {
    /// The database connection for reading goals and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The advisor that answers questions.
    pub advisor: Arc<dyn Advisor>,
    /// What the advisor is told about the user.
    pub config: AdvisorConfig,
}

impl FromRef<AppState> for AdvisorState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            advisor: state.advisor.clone(),
            config: state.advisor_config.clone(),
        }
    }
}

/// The request body for asking the advisor a question.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    /// The user asking the question.
    pub user_id: Option<String>,
    /// The question.
    pub message: Option<String>,
}

/// The advisor's answer.
#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    /// The advice, passed on verbatim from the advisor.
    pub advice: String,
}

/// A route handler that answers a question using the user's goals and recent transactions.
pub async fn get_advice_endpoint(
    State(state): State<AdvisorState>,
    payload: Result<Json<AdviceRequest>, JsonRejection>,
) -> Result<Json<AdviceResponse>, Error> {
    let request = json_body(payload)?;

    RequiredFields::new()
        .text("userId", &request.user_id)
        .text("message", &request.message)
        .check()?;

    let user_id = UserId::from_param(request.user_id.as_deref())?;
    let message = request.message.unwrap_or_default();

    let (goals, transactions) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_goals_for_user(&user_id, &connection)?,
            get_recent_transactions(&user_id, state.config.recent_transactions, &connection)?,
        )
    };

    let prompt = AdvisorPrompt::new(message.trim(), goals, &transactions);
    tracing::debug!("Advisor prompt for user {user_id}:\n{}", prompt.text);

    let advice = state.advisor.advise(&prompt).await.map_err(|error| match error {
        Error::AdvisorError(_) => error,
        other => Error::AdvisorError(other.to_string()),
    })?;

    Ok(Json(AdviceResponse { advice }))
}
