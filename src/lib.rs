//! Fintrack is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording transactions and
//! savings goals, listing them with filters and pagination, summarising a
//! user's finances and asking an advisor for suggestions.
//!
//! Users are identified by an opaque user ID issued by an external identity
//! provider. Every record is scoped to the user that created it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod advisor;
mod app_state;
mod currency;
mod database_id;
mod date;
mod db;
mod endpoints;
mod filter;
mod goal;
mod logging;
mod not_found;
mod pagination;
mod report;
mod request;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use advisor::{AdviceFuture, Advisor, AdvisorConfig, AdvisorPrompt, KeywordAdvisor};
pub use app_state::AppState;
pub use database_id::{DatabaseId, GoalId, TransactionId};
pub use db::initialize as initialize_db;
pub use goal::{Goal, NewGoal, Priority, create_goal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{Transaction, TransactionBuilder, TransactionType, create_transaction};
pub use user::UserId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The message sent to clients when the advisor fails.
///
/// The underlying error is logged on the server instead.
pub const ADVISOR_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't come up with any advice right now. Please try again later.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request was missing one or more required fields.
    ///
    /// The fields are listed using their JSON names, e.g. "targetAmount".
    #[error("Missing required fields: {} are required.", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A request did not specify which user it is for.
    #[error("userId is required")]
    MissingUserId,

    /// A required text field was blank.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A transaction type other than income or expense was given.
    #[error("Type must be either 'income' or 'expense', got \"{0}\"")]
    InvalidTransactionType(String),

    /// A goal priority other than high, medium or low was given.
    #[error("Priority must be one of 'High', 'Medium' or 'Low', got \"{0}\"")]
    InvalidPriority(String),

    /// An amount was not a usable number, e.g. NaN or negative.
    #[error("{field} must be {requirement}")]
    InvalidAmount {
        /// The JSON name of the offending field.
        field: &'static str,
        /// What the value needs to be, e.g. "a positive number".
        requirement: &'static str,
    },

    /// A date could not be parsed.
    #[error("invalid date \"{0}\", expected a date like 2025-01-31")]
    InvalidDate(String),

    /// A query string parameter had an unusable value.
    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),

    /// The request body was not valid JSON or had fields of the wrong type.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found or unauthorized")]
    TransactionNotFound,

    /// The goal does not exist or belongs to another user.
    #[error("Goal not found or unauthorized")]
    GoalNotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The advisor could not produce any advice.
    ///
    /// The error string should only be logged, clients get
    /// [ADVISOR_FAILURE_MESSAGE].
    #[error("the advisor failed: {0}")]
    AdvisorError(String),

    /// An error occurred while writing CSV output.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields(_)
            | Error::MissingUserId
            | Error::EmptyField(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidPriority(_)
            | Error::InvalidAmount { .. }
            | Error::InvalidDate(_)
            | Error::InvalidQuery(_)
            | Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::TransactionNotFound | Error::GoalNotFound => {
                StatusCode::NOT_FOUND
            }
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::AdvisorError(_)
            | Error::CsvError(_)
            | Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::AdvisorError(ref error) => {
                tracing::error!("The advisor failed: {error}");
                ADVISOR_FAILURE_MESSAGE.to_owned()
            }
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                error.to_string()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
