//! Defines the endpoint for updating an existing transaction.

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
    database_id::TransactionId,
    date::parse_date,
    request::json_body,
    transaction::{
        Transaction,
        core::{category_or_uncategorized, get_transaction, update_transaction},
    },
    user::UserId,
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields that may be changed on a transaction. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTransactionRequest {
    /// The user that owns the transaction.
    pub user_id: Option<String>,
    /// "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new category.
    pub category: Option<String>,
    /// The new date.
    pub date: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new note.
    pub note: Option<String>,
}

impl EditTransactionRequest {
    /// Override the fields of `transaction` that are present in this request.
    fn apply_to(self, mut transaction: Transaction) -> Result<Transaction, Error> {
        if let Some(transaction_type) = self.transaction_type {
            transaction.transaction_type = transaction_type.parse()?;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }

        if let Some(category) = self.category {
            transaction.category = category_or_uncategorized(&category).to_owned();
        }

        if let Some(date) = self.date {
            transaction.date = parse_date(&date)?;
        }

        if let Some(description) = self.description {
            transaction.description = description;
        }

        if self.note.is_some() {
            transaction.note = self.note;
        }

        Ok(transaction)
    }
}

/// A route handler for updating a transaction owned by the requesting user.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    payload: Result<Json<EditTransactionRequest>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let request = json_body(payload)?;
    let user_id = UserId::from_param(request.user_id.as_deref())?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &user_id, &connection)?;
    let transaction = request.apply_to(transaction)?;
    let transaction = update_transaction(&transaction, &connection)?;

    Ok(Json(json!({
        "message": "Transaction updated successfully",
        "transaction": transaction,
    })))
}
