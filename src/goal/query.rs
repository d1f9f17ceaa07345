//! Filtering, sorting and paging of a user's goals.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;

use crate::{
    Error,
    filter::{SortOrder, SqlFilter, facet_param, text_param},
    goal::{
        Goal, Priority,
        core::{GOAL_COLUMNS, PRIORITY_RANK, map_goal_row},
    },
    pagination::PageRequest,
    user::UserId,
};

/// The query string parameters accepted when listing goals.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalQueryParams {
    /// The user whose goals to list.
    pub user_id: Option<String>,
    /// Only include goals whose name or description contains this text.
    pub search: Option<String>,
    /// Only include goals with this priority, "all" for any.
    pub priority: Option<String>,
    /// The field to sort by.
    pub sort_by: Option<String>,
    /// "asc" for ascending, anything else for descending.
    pub sort_order: Option<String>,
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of goals per page.
    pub limit: Option<u64>,
}

/// The fields goals can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalSortField {
    /// Sort by when the goal should be reached.
    #[default]
    TargetDate,
    /// Sort by name.
    Name,
    /// Sort by the target amount.
    TargetAmount,
    /// Sort by the amount saved so far.
    CurrentAmount,
    /// Sort by importance, ascending puts high priority first.
    Priority,
    /// Sort by the planned monthly contribution.
    MonthlyContribution,
}

impl GoalSortField {
    /// Read the `sortBy` query parameter, defaulting to [GoalSortField::TargetDate].
    ///
    /// # Errors
    /// Returns [Error::InvalidQuery] if `value` is not a sortable field.
    pub fn from_param(value: Option<&str>) -> Result<Self, Error> {
        let Some(value) = text_param(value) else {
            return Ok(Self::default());
        };

        match value {
            "targetDate" => Ok(Self::TargetDate),
            "name" => Ok(Self::Name),
            "targetAmount" => Ok(Self::TargetAmount),
            "currentAmount" => Ok(Self::CurrentAmount),
            "priority" => Ok(Self::Priority),
            "monthlyContribution" => Ok(Self::MonthlyContribution),
            other => Err(Error::InvalidQuery(format!(
                "cannot sort goals by \"{other}\""
            ))),
        }
    }

    fn expression(&self) -> &'static str {
        match self {
            Self::TargetDate => "target_date",
            Self::Name => "name",
            Self::TargetAmount => "target_amount",
            Self::CurrentAmount => "current_amount",
            Self::Priority => PRIORITY_RANK,
            Self::MonthlyContribution => "monthly_contribution",
        }
    }
}

/// A validated description of which goals to fetch and in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalFilter {
    /// The owner of the goals.
    pub user_id: UserId,
    /// Case-insensitive text to look for in the name or description.
    pub search: Option<String>,
    /// Exact priority to match.
    pub priority: Option<Priority>,
    /// The field to sort by.
    pub sort_by: GoalSortField,
    /// The direction to sort in.
    pub sort_order: SortOrder,
}

impl GoalFilter {
    /// A filter matching every goal of `user_id`, latest target date first.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            search: None,
            priority: None,
            sort_by: GoalSortField::TargetDate,
            sort_order: SortOrder::Descending,
        }
    }

    /// Validate the query string parameters.
    ///
    /// # Errors
    /// Returns an error if the user ID is missing, or the priority or sort
    /// field are invalid.
    pub fn from_params(params: &GoalQueryParams) -> Result<Self, Error> {
        Ok(Self {
            user_id: UserId::from_param(params.user_id.as_deref())?,
            search: text_param(params.search.as_deref()).map(str::to_owned),
            priority: facet_param(params.priority.as_deref())
                .map(str::parse)
                .transpose()?,
            sort_by: GoalSortField::from_param(params.sort_by.as_deref())?,
            sort_order: SortOrder::from_param(params.sort_order.as_deref()),
        })
    }

    fn to_sql_filter(&self) -> SqlFilter {
        let mut filter = SqlFilter::for_user(&self.user_id);

        if let Some(search) = &self.search {
            filter = filter.contains_text(&["name", "description"], search);
        }

        if let Some(priority) = self.priority {
            filter = filter.equals("priority", priority.as_str().to_owned());
        }

        filter
    }

    fn order_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, id ASC",
            self.sort_by.expression(),
            self.sort_order.as_sql()
        )
    }
}

/// Get the goals matching `filter`, limited to `page` if given.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_goals(
    filter: &GoalFilter,
    page: Option<&PageRequest>,
    connection: &Connection,
) -> Result<Vec<Goal>, Error> {
    let sql_filter = filter.to_sql_filter();
    let mut params = sql_filter.params().to_vec();

    let limit_clause = match page {
        Some(page) => {
            params.push(Value::Integer(i64::try_from(page.limit).unwrap_or(i64::MAX)));
            params.push(Value::Integer(
                i64::try_from(page.offset()).unwrap_or(i64::MAX),
            ));
            "LIMIT ? OFFSET ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT {GOAL_COLUMNS} FROM goal {} {} {limit_clause}",
        sql_filter.where_clause(),
        filter.order_clause(),
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), map_goal_row)?
        .map(|goal_result| goal_result.map_err(Error::from))
        .collect()
}

/// Count every goal matching `filter`, ignoring paging.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_matching_goals(filter: &GoalFilter, connection: &Connection) -> Result<u64, Error> {
    let sql_filter = filter.to_sql_filter();

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM goal {}", sql_filter.where_clause()),
        params_from_iter(sql_filter.params().iter()),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Get the distinct priorities used by `user_id`, most important first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_priorities(user_id: &UserId, connection: &Connection) -> Result<Vec<Priority>, Error> {
    let mut priorities = connection
        .prepare("SELECT DISTINCT priority FROM goal WHERE user_id = ?1")?
        .query_map([user_id], |row| row.get(0))?
        .collect::<Result<Vec<Priority>, _>>()?;

    priorities.sort_by_key(Priority::rank);

    Ok(priorities)
}
