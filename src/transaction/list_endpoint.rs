//! Defines the endpoint for listing a page of a user's transactions.

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
    pagination::{PageInfo, PageRequest, PaginationConfig},
    request::query_params,
    transaction::{
        Transaction,
        query::{
            TransactionFilter, TransactionQueryParams, count_matching_transactions,
            get_categories, query_transactions,
        },
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A page of transactions with the paging metadata and category facets.
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    /// The transactions on the requested page.
    pub transactions: Vec<Transaction>,
    /// Paging metadata.
    #[serde(flatten)]
    pub page_info: PageInfo,
    /// "all" followed by every category the user has used.
    pub categories: Vec<String>,
}

/// A route handler for listing a filtered, sorted page of a user's transactions.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    query: Result<Query<TransactionQueryParams>, QueryRejection>,
) -> Result<Json<TransactionPage>, Error> {
    let params = query_params(query)?;
    let filter = TransactionFilter::from_params(&params)?;
    let page_request = PageRequest::new(
        params.page,
        params.limit,
        state.pagination_config.default_transactions_per_page,
        &state.pagination_config,
    )?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction_page(&filter, &page_request, &connection).map(Json)
}

/// Read the page, the total count and the category facets from one snapshot
/// of the database.
fn get_transaction_page(
    filter: &TransactionFilter,
    page_request: &PageRequest,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let snapshot = SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let transactions = query_transactions(filter, Some(page_request), &snapshot)?;
    let total_count = count_matching_transactions(filter, &snapshot)?;
    let categories = get_categories(&filter.user_id, &snapshot)?;

    snapshot.commit()?;

    Ok(TransactionPage {
        page_info: PageInfo::new(page_request, transactions.len(), total_count),
        transactions,
        categories: with_all_facet(categories),
    })
}
