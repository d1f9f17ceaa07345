//! Defines the endpoint for creating a new transaction.

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
    date::parse_optional_date,
    request::{RequiredFields, json_body},
    timezone,
    transaction::{
        Transaction, TransactionType, UNCATEGORIZED,
        core::{category_or_uncategorized, create_transaction},
    },
    user::UserId,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating a transaction.
///
/// Every field is optional here so that missing fields can be reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// The user that will own the transaction.
    pub user_id: Option<String>,
    /// "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// The amount of money spent or earned.
    pub amount: Option<f64>,
    /// Defaults to "Uncategorized".
    pub category: Option<String>,
    /// Defaults to today in the server's timezone.
    pub date: Option<String>,
    /// Defaults to an empty string.
    pub description: Option<String>,
    /// An optional note.
    pub note: Option<String>,
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let request = json_body(payload)?;

    RequiredFields::new()
        .text("userId", &request.user_id)
        .text("type", &request.transaction_type)
        .value("amount", &request.amount)
        .check()?;

    let user_id = UserId::from_param(request.user_id.as_deref())?;
    let transaction_type: TransactionType = request
        .transaction_type
        .as_deref()
        .unwrap_or_default()
        .parse()?;
    let amount = request.amount.unwrap_or_default();
    let date = match parse_optional_date(request.date.as_deref())? {
        Some(date) => date,
        None => timezone::today(&state.local_timezone)?,
    };
    let category = request
        .category
        .as_deref()
        .map_or(UNCATEGORIZED, category_or_uncategorized);

    let builder = Transaction::build(user_id, transaction_type, amount, date)
        .category(category)
        .description(request.description.as_deref().unwrap_or_default())
        .note(request.note);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(builder, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    tracing::info!(
        "Created transaction {} for user {}",
        transaction.id,
        transaction.user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction added successfully",
            "transaction": transaction,
        })),
    ))
}
