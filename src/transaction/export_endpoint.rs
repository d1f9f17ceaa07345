//! Defines the endpoint for downloading a user's transactions as CSV.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    request::query_params,
    timezone,
    transaction::{
        Transaction,
        query::{TransactionFilter, TransactionQueryParams, query_transactions},
    },
};

const CSV_HEADER: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that responds with every transaction matching the listing
/// filters as a CSV attachment. Paging parameters are ignored.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    query: Result<Query<TransactionQueryParams>, QueryRejection>,
) -> Result<Response, Error> {
    let params = query_params(query)?;
    let filter = TransactionFilter::from_params(&params)?;
    let today = timezone::today(&state.local_timezone)?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        query_transactions(&filter, None, &connection)?
    };

    let csv = write_transactions_csv(&transactions)?;
    let disposition = format!("attachment; filename=\"transactions_{today}.csv\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

fn write_transactions_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string(),
                transaction.description.clone(),
                transaction.category.clone(),
                transaction.transaction_type.to_string(),
                transaction.amount.to_string(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}
