//! Defines the savings goal model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::GoalId, date::iso_date, user::UserId};

/// The columns selected for a [Goal], in the order [map_goal_row] expects.
pub(crate) const GOAL_COLUMNS: &str = "id, user_id, name, target_amount, current_amount, \
    target_date, description, priority, monthly_contribution";

/// How important a goal is to the user.
///
/// Priorities are ordered from most to least important, so sorting ascending
/// puts [Priority::High] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    /// The most important goals.
    High,
    /// Goals of ordinary importance.
    Medium,
    /// Goals that can wait.
    Low,
}

impl Priority {
    /// The canonical name, e.g. "High".
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// The rank used for sorting, lower is more important.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        [Priority::High, Priority::Medium, Priority::Low]
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidPriority(s.to_owned()))
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Something the user is saving towards, e.g. an emergency fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserId,
    /// A short name, e.g. "Emergency fund".
    pub name: String,
    /// How much the user wants to have saved.
    pub target_amount: f64,
    /// How much the user has saved so far.
    pub current_amount: f64,
    /// When the user wants to reach the target.
    #[serde(with = "iso_date")]
    pub target_date: Date,
    /// Free text describing the goal.
    pub description: String,
    /// How important the goal is.
    pub priority: Priority,
    /// How much the user plans to put towards the goal each month.
    pub monthly_contribution: f64,
}

impl Goal {
    /// How far the goal is towards its target as a whole percentage.
    ///
    /// Returns 0 when the target is zero.
    pub fn progress_percentage(&self) -> i64 {
        progress_percentage(self.current_amount, self.target_amount)
    }
}

/// `current / target` as a whole percentage, 0 when `target` is zero.
pub fn progress_percentage(current: f64, target: f64) -> i64 {
    if target == 0.0 {
        return 0;
    }

    (current / target * 100.0).round() as i64
}

/// The data needed to create a [Goal].
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// The user that will own the goal.
    pub user_id: UserId,
    /// A short, non-empty name.
    pub name: String,
    /// How much the user wants to have saved.
    pub target_amount: f64,
    /// How much the user has saved so far.
    pub current_amount: f64,
    /// When the user wants to reach the target.
    pub target_date: Date,
    /// Free text describing the goal.
    pub description: String,
    /// How important the goal is.
    pub priority: Priority,
    /// How much the user plans to put towards the goal each month.
    pub monthly_contribution: f64,
}

/// Check that the user editable fields of a goal are usable.
///
/// # Errors
/// Returns [Error::EmptyField] for a blank name or [Error::InvalidAmount] for
/// an amount that is negative or not a finite number.
pub fn validate_goal_fields(
    name: &str,
    target_amount: f64,
    current_amount: f64,
    monthly_contribution: f64,
) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField("name"));
    }

    for (field, amount) in [
        ("targetAmount", target_amount),
        ("currentAmount", current_amount),
        ("monthlyContribution", monthly_contribution),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount {
                field,
                requirement: "a number that is zero or greater",
            });
        }
    }

    Ok(())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new goal in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] or [Error::InvalidAmount] if the goal is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    validate_goal_fields(
        &goal.name,
        goal.target_amount,
        goal.current_amount,
        goal.monthly_contribution,
    )?;

    let goal = connection
        .prepare(&format!(
            "INSERT INTO goal (user_id, name, target_amount, current_amount, target_date, description, priority, monthly_contribution)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            params![
                goal.user_id,
                goal.name.trim(),
                goal.target_amount,
                goal.current_amount,
                goal.target_date,
                goal.description,
                goal.priority,
                goal.monthly_contribution,
            ],
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve the goal `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::GoalNotFound] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_goal(id: GoalId, user_id: &UserId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row(params![id, user_id], map_goal_row)
        .map_err(map_missing_goal)
}

/// Get every goal owned by `user_id`, most important and soonest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_goals_for_user(user_id: &UserId, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal
             WHERE user_id = ?1
             ORDER BY {PRIORITY_RANK} ASC, target_date ASC, id ASC"
        ))?
        .query_map([user_id], map_goal_row)?
        .map(|goal_result| goal_result.map_err(Error::from))
        .collect()
}

/// Overwrite the stored goal with the same ID and owner as `goal`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] or [Error::InvalidAmount] if the goal is invalid,
/// - [Error::GoalNotFound] if there is no such goal for the owner,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_goal(goal: &Goal, connection: &Connection) -> Result<Goal, Error> {
    validate_goal_fields(
        &goal.name,
        goal.target_amount,
        goal.current_amount,
        goal.monthly_contribution,
    )?;

    connection
        .prepare(&format!(
            "UPDATE goal
             SET name = ?1, target_amount = ?2, current_amount = ?3, target_date = ?4,
                 description = ?5, priority = ?6, monthly_contribution = ?7
             WHERE id = ?8 AND user_id = ?9
             RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            params![
                goal.name.trim(),
                goal.target_amount,
                goal.current_amount,
                goal.target_date,
                goal.description,
                goal.priority,
                goal.monthly_contribution,
                goal.id,
                goal.user_id,
            ],
            map_goal_row,
        )
        .map_err(map_missing_goal)
}

/// Delete the goal `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::GoalNotFound] if there is no such goal for `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_goal(id: GoalId, user_id: &UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::GoalNotFound);
    }

    Ok(())
}

/// Get the total number of goals in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_goals(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM goal;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// SQL expression that sorts priorities from high to low when ascending.
pub(crate) const PRIORITY_RANK: &str =
    "CASE priority WHEN 'High' THEN 0 WHEN 'Medium' THEN 1 ELSE 2 END";

/// Create the goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL,
            target_date TEXT NOT NULL,
            description TEXT NOT NULL,
            priority TEXT NOT NULL CHECK (priority IN ('High', 'Medium', 'Low')),
            monthly_contribution REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_goal_user_target_date ON goal(user_id, target_date);",
    )
}

/// Map a database row to a Goal.
pub fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        target_date: row.get(5)?,
        description: row.get(6)?,
        priority: row.get(7)?,
        monthly_contribution: row.get(8)?,
    })
}

fn map_missing_goal(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::GoalNotFound,
        error => error.into(),
    }
}

#[cfg(test)]
mod priority_tests {
    use crate::{Error, goal::Priority};

    #[test]
    fn parses_any_casing() {
        assert_eq!("high".parse(), Ok(Priority::High));
        assert_eq!("MEDIUM".parse(), Ok(Priority::Medium));
        assert_eq!(" Low ".parse(), Ok(Priority::Low));
    }

    #[test]
    fn rejects_unknown_priority() {
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(Error::InvalidPriority("urgent".to_owned()))
        );
    }

    #[test]
    fn serializes_canonical_name() {
        let priority: Priority = serde_json::from_str("\"hIgH\"").unwrap();

        assert_eq!(serde_json::to_value(priority).unwrap(), "High");
    }

    #[test]
    fn orders_by_importance() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];

        priorities.sort();

        assert_eq!(priorities, [Priority::High, Priority::Medium, Priority::Low]);
    }
}
