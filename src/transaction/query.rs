//! Filtering, sorting and paging of a user's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    date::parse_optional_date,
    filter::{SortOrder, SqlFilter, facet_param, text_param},
    pagination::PageRequest,
    transaction::{
        Transaction, TransactionType,
        core::{TRANSACTION_COLUMNS, map_transaction_row},
    },
    user::UserId,
};

/// The query string parameters accepted when listing or exporting transactions.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQueryParams {
    /// The user whose transactions to list.
    pub user_id: Option<String>,
    /// Only include transactions whose description contains this text.
    pub search: Option<String>,
    /// Only include transactions in this category, "all" for any.
    pub category: Option<String>,
    /// Only include income or expenses, "all" for both.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Only include transactions on or after this date.
    pub date_from: Option<String>,
    /// Only include transactions on or before this date.
    pub date_to: Option<String>,
    /// The field to sort by.
    pub sort_by: Option<String>,
    /// "asc" for ascending, anything else for descending.
    pub sort_order: Option<String>,
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub limit: Option<u64>,
}

/// The fields transactions can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSortField {
    /// Sort by the transaction date.
    #[default]
    Date,
    /// Sort by amount.
    Amount,
    /// Sort by category name.
    Category,
    /// Sort by description.
    Description,
    /// Sort by income/expense.
    Type,
}

impl TransactionSortField {
    /// Read the `sortBy` query parameter, defaulting to [TransactionSortField::Date].
    ///
    /// # Errors
    /// Returns [Error::InvalidQuery] if `value` is not a sortable field.
    pub fn from_param(value: Option<&str>) -> Result<Self, Error> {
        let Some(value) = text_param(value) else {
            return Ok(Self::default());
        };

        match value {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            "description" => Ok(Self::Description),
            "type" => Ok(Self::Type),
            other => Err(Error::InvalidQuery(format!(
                "cannot sort transactions by \"{other}\""
            ))),
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Description => "description",
            Self::Type => "type",
        }
    }
}

/// A validated description of which transactions to fetch and in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    /// The owner of the transactions.
    pub user_id: UserId,
    /// Case-insensitive text to look for in the description.
    pub search: Option<String>,
    /// Exact category to match.
    pub category: Option<String>,
    /// Income or expense.
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower bound on the date.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the date.
    pub date_to: Option<Date>,
    /// The field to sort by.
    pub sort_by: TransactionSortField,
    /// The direction to sort in.
    pub sort_order: SortOrder,
}

impl TransactionFilter {
    /// A filter matching every transaction of `user_id`, newest first.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            search: None,
            category: None,
            transaction_type: None,
            date_from: None,
            date_to: None,
            sort_by: TransactionSortField::Date,
            sort_order: SortOrder::Descending,
        }
    }

    /// Validate the query string parameters.
    ///
    /// # Errors
    /// Returns an error if the user ID is missing, or the type, dates or sort
    /// field are invalid.
    pub fn from_params(params: &TransactionQueryParams) -> Result<Self, Error> {
        let user_id = UserId::from_param(params.user_id.as_deref())?;
        let transaction_type = facet_param(params.transaction_type.as_deref())
            .map(str::parse)
            .transpose()?;

        Ok(Self {
            user_id,
            search: text_param(params.search.as_deref()).map(str::to_owned),
            category: facet_param(params.category.as_deref()).map(str::to_owned),
            transaction_type,
            date_from: parse_optional_date(params.date_from.as_deref())?,
            date_to: parse_optional_date(params.date_to.as_deref())?,
            sort_by: TransactionSortField::from_param(params.sort_by.as_deref())?,
            sort_order: SortOrder::from_param(params.sort_order.as_deref()),
        })
    }

    fn to_sql_filter(&self) -> SqlFilter {
        let mut filter = SqlFilter::for_user(&self.user_id);

        if let Some(search) = &self.search {
            filter = filter.contains_text(&["description"], search);
        }

        if let Some(category) = &self.category {
            filter = filter.equals("category", category.clone());
        }

        if let Some(transaction_type) = self.transaction_type {
            filter = filter.equals("type", transaction_type.as_str().to_owned());
        }

        if let Some(date_from) = self.date_from {
            filter = filter.at_least("date", date_from.to_string());
        }

        if let Some(date_to) = self.date_to {
            filter = filter.at_most("date", date_to.to_string());
        }

        filter
    }

    fn order_clause(&self) -> String {
        // Break ties by ID to keep the order stable between pages.
        format!(
            "ORDER BY {} {}, id ASC",
            self.sort_by.column(),
            self.sort_order.as_sql()
        )
    }
}

/// Get the transactions matching `filter`, limited to `page` if given.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_transactions(
    filter: &TransactionFilter,
    page: Option<&PageRequest>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_filter = filter.to_sql_filter();
    let mut params = sql_filter.params().to_vec();

    let limit_clause = match page {
        Some(page) => {
            params.push(Value::Integer(to_sql_integer(page.limit)));
            params.push(Value::Integer(to_sql_integer(page.offset())));
            "LIMIT ? OFFSET ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {} {} {limit_clause}",
        sql_filter.where_clause(),
        filter.order_clause(),
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Count every transaction matching `filter`, ignoring paging.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_matching_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let sql_filter = filter.to_sql_filter();

    let count: i64 = connection.query_row(
        &format!(
            "SELECT COUNT(id) FROM \"transaction\" {}",
            sql_filter.where_clause()
        ),
        params_from_iter(sql_filter.params().iter()),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Get the distinct categories used by `user_id`, sorted alphabetically.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_categories(user_id: &UserId, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT category FROM \"transaction\" WHERE user_id = ?1 ORDER BY category ASC",
        )?
        .query_map([user_id], |row| row.get(0))?
        .map(|category| category.map_err(Error::from))
        .collect()
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        filter::SortOrder,
        pagination::PageRequest,
        transaction::{Transaction, TransactionType, create_transaction},
        user::UserId,
    };

    use super::{
        TransactionFilter, TransactionQueryParams, TransactionSortField,
        count_matching_transactions, get_categories, query_transactions,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn insert_test_transactions(conn: &Connection) {
        let rows = [
            ("u1", TransactionType::Expense, 1200.0, "Housing", date!(2025 - 01 - 01), "Rent"),
            ("u1", TransactionType::Expense, 80.5, "Food", date!(2025 - 01 - 03), "Groceries"),
            ("u1", TransactionType::Income, 3000.0, "Salary", date!(2025 - 01 - 15), "Pay day"),
            ("u1", TransactionType::Expense, 1200.0, "Housing", date!(2025 - 02 - 01), "RENT"),
            ("u2", TransactionType::Expense, 999.0, "Travel", date!(2025 - 01 - 10), "Rent a car"),
        ];

        for (user_id, transaction_type, amount, category, date, description) in rows {
            create_transaction(
                Transaction::build(user(user_id), transaction_type, amount, date)
                    .category(category)
                    .description(description),
                conn,
            )
            .expect("Could not create test transaction");
        }
    }

    #[test]
    fn filter_requires_user_id() {
        let result = TransactionFilter::from_params(&TransactionQueryParams::default());

        assert_eq!(result, Err(Error::MissingUserId));
    }

    #[test]
    fn filter_treats_all_as_no_filter() {
        let params = TransactionQueryParams {
            user_id: Some("u1".to_owned()),
            category: Some("all".to_owned()),
            transaction_type: Some("all".to_owned()),
            ..Default::default()
        };

        let filter = TransactionFilter::from_params(&params).unwrap();

        assert_eq!(filter, TransactionFilter::for_user(user("u1")));
    }

    #[test]
    fn filter_rejects_unknown_sort_field() {
        let params = TransactionQueryParams {
            user_id: Some("u1".to_owned()),
            sort_by: Some("userId".to_owned()),
            ..Default::default()
        };

        let result = TransactionFilter::from_params(&params);

        assert!(matches!(result, Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn filter_rejects_unknown_type() {
        let params = TransactionQueryParams {
            user_id: Some("u1".to_owned()),
            transaction_type: Some("transfer".to_owned()),
            ..Default::default()
        };

        let result = TransactionFilter::from_params(&params);

        assert_eq!(
            result,
            Err(Error::InvalidTransactionType("transfer".to_owned()))
        );
    }

    #[test]
    fn default_order_is_newest_first_and_scoped_to_user() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);

        let got = query_transactions(&TransactionFilter::for_user(user("u1")), None, &conn)
            .unwrap();

        let dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        assert_eq!(
            dates,
            [
                date!(2025 - 02 - 01),
                date!(2025 - 01 - 15),
                date!(2025 - 01 - 03),
                date!(2025 - 01 - 01),
            ]
        );
    }

    #[test]
    fn search_is_case_insensitive() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);
        let filter = TransactionFilter {
            search: Some("rent".to_owned()),
            ..TransactionFilter::for_user(user("u1"))
        };

        let got = query_transactions(&filter, None, &conn).unwrap();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|transaction| transaction.category == "Housing"));
    }

    #[test]
    fn date_range_is_inclusive() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);
        let filter = TransactionFilter {
            date_from: Some(date!(2025 - 01 - 03)),
            date_to: Some(date!(2025 - 01 - 15)),
            ..TransactionFilter::for_user(user("u1"))
        };

        let got = query_transactions(&filter, None, &conn).unwrap();

        let descriptions: Vec<_> = got
            .iter()
            .map(|transaction| transaction.description.as_str())
            .collect();
        assert_eq!(descriptions, ["Pay day", "Groceries"]);
    }

    #[test]
    fn sorts_by_amount_ascending_with_id_tiebreak() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);
        let filter = TransactionFilter {
            sort_by: TransactionSortField::Amount,
            sort_order: SortOrder::Ascending,
            ..TransactionFilter::for_user(user("u1"))
        };

        let got = query_transactions(&filter, None, &conn).unwrap();

        let ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, [2, 1, 4, 3]);
    }

    #[test]
    fn type_and_category_filters_combine() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);
        let filter = TransactionFilter {
            category: Some("Housing".to_owned()),
            transaction_type: Some(TransactionType::Expense),
            ..TransactionFilter::for_user(user("u1"))
        };

        let got = query_transactions(&filter, None, &conn).unwrap();
        let count = count_matching_transactions(&filter, &conn).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(count, 2);
    }

    #[test]
    fn pages_do_not_overlap() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);
        let filter = TransactionFilter::for_user(user("u1"));

        let first = query_transactions(&filter, Some(&PageRequest { page: 1, limit: 3 }), &conn)
            .unwrap();
        let second = query_transactions(&filter, Some(&PageRequest { page: 2, limit: 3 }), &conn)
            .unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 1);
        assert!(first.iter().all(|transaction| transaction.id != second[0].id));
        assert_eq!(count_matching_transactions(&filter, &conn), Ok(4));
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let conn = get_test_connection();
        insert_test_transactions(&conn);

        let got = get_categories(&user("u1"), &conn).unwrap();

        assert_eq!(got, ["Food", "Housing", "Salary"]);
    }
}
