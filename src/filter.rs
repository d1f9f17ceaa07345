//! Translation of listing filters into SQL `WHERE` and `ORDER BY` clauses.
//!
//! Column names passed to [SqlFilter] are always static strings chosen by the
//! caller. User supplied values only ever end up in bound parameters.

use rusqlite::types::Value;

use crate::user::UserId;

/// The synthetic facet value meaning "do not filter on this field".
pub const ALL_FACET: &str = "all";

/// The order to sort results in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

impl SortOrder {
    /// Read the `sortOrder` query parameter. Only "asc" sorts ascending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }

    /// The SQL keyword for this order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// A conjunction of SQL conditions and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl SqlFilter {
    /// Start a filter that only matches rows owned by `user_id`.
    pub fn for_user(user_id: &UserId) -> Self {
        Self {
            conditions: vec!["user_id = ?".to_owned()],
            params: vec![Value::Text(user_id.as_str().to_owned())],
        }
    }

    /// Only match rows where `column` equals `value`.
    pub fn equals(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(format!("{column} = ?"));
        self.params.push(value.into());
        self
    }

    /// Only match rows where `column` is greater than or equal to `value`.
    pub fn at_least(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(format!("{column} >= ?"));
        self.params.push(value.into());
        self
    }

    /// Only match rows where `column` is less than or equal to `value`.
    pub fn at_most(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(format!("{column} <= ?"));
        self.params.push(value.into());
        self
    }

    /// Only match rows where any of `columns` contains `needle`, ignoring ASCII case.
    pub fn contains_text(mut self, columns: &[&'static str], needle: &str) -> Self {
        if columns.is_empty() {
            return self;
        }

        let pattern = format!("%{}%", escape_like(needle));
        let condition = columns
            .iter()
            .map(|column| format!("{column} LIKE ? ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");

        self.conditions.push(format!("({condition})"));
        self.params
            .extend(columns.iter().map(|_| Value::Text(pattern.clone())));
        self
    }

    /// The `WHERE ...` clause, including the keyword.
    pub fn where_clause(&self) -> String {
        format!("WHERE {}", self.conditions.join(" AND "))
    }

    /// The values to bind, in the order their placeholders appear in [Self::where_clause].
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Return `value` trimmed, or `None` if it is absent, blank or the [ALL_FACET] sentinel.
pub fn facet_param(value: Option<&str>) -> Option<&str> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case(ALL_FACET) => None,
        Some(value) => Some(value),
    }
}

/// Return `value` trimmed, or `None` if it is absent or blank.
pub fn text_param(value: Option<&str>) -> Option<&str> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(value),
    }
}

/// Prepend the [ALL_FACET] option to a list of facet values.
pub fn with_all_facet(values: Vec<String>) -> Vec<String> {
    std::iter::once(ALL_FACET.to_owned()).chain(values).collect()
}
