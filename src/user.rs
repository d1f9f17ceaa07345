//! The identity of the user that owns goals and transactions.
//!
//! Users are managed by an external identity provider. This application only
//! ever sees the opaque ID the provider hands out, so there is no user table.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The opaque, non-empty ID of a user issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingUserId] if `id` is empty or only whitespace.
    pub fn new(id: &str) -> Result<Self, Error> {
        let id = id.trim();

        if id.is_empty() {
            Err(Error::MissingUserId)
        } else {
            Ok(Self(id.to_owned()))
        }
    }

    /// Create a user ID from an optional request parameter.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingUserId] if `id` is `None` or blank.
    pub fn from_param(id: Option<&str>) -> Result<Self, Error> {
        id.map_or(Err(Error::MissingUserId), Self::new)
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        UserId::new(value.as_str()?).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Query string parameters for requests that only need to know the user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// The ID of the user making the request.
    pub user_id: Option<String>,
}

impl UserQuery {
    /// Validate and return the user ID.
    pub fn user_id(&self) -> Result<UserId, Error> {
        UserId::from_param(self.user_id.as_deref())
    }
}
