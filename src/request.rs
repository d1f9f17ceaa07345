//! Helpers for validating request bodies and query strings.

use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
};

use crate::Error;

/// Unwrap a JSON body, turning axum's rejection into an [Error::InvalidRequestBody].
///
/// Handlers take `Result<Json<T>, JsonRejection>` so that malformed bodies get
/// the same `{"error": ...}` response as every other client error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))
}

/// Unwrap a query string, turning axum's rejection into an [Error::InvalidQuery].
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Error> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
}

/// Collects the names of required fields that are missing from a request.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    /// Start with no missing fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as missing if `value` is `None`.
    pub fn value<T>(mut self, name: &'static str, value: &Option<T>) -> Self {
        if value.is_none() {
            self.missing.push(name);
        }

        self
    }

    /// Record `name` as missing if `value` is `None` or blank.
    pub fn text(mut self, name: &'static str, value: &Option<String>) -> Self {
        if value.as_deref().is_none_or(|text| text.trim().is_empty()) {
            self.missing.push(name);
        }

        self
    }

    /// # Errors
    /// Returns [Error::MissingFields] naming every missing field, if there are any.
    pub fn check(self) -> Result<(), Error> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields(self.missing))
        }
    }
}
