use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    request::query_params,
    transaction::{Transaction, core::get_transaction},
    user::UserQuery,
};

/// The state needed to get a single transaction.
#[derive(Debug, Clone)]
pub struct ViewTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ViewTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with a single transaction owned by the requesting user.
pub async fn get_transaction_endpoint(
    State(state): State<ViewTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Transaction>, Error> {
    let user_id = query_params(query)?.user_id()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction(transaction_id, &user_id, &connection).map(Json)
}
