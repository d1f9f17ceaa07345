//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction API and CSV export

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod export_endpoint;
mod list_endpoint;
mod query;
mod view_endpoint;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, UNCATEGORIZED, create_transaction,
    create_transaction_table, get_recent_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use export_endpoint::export_transactions_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionFilter, query_transactions};
pub use view_endpoint::get_transaction_endpoint;

#[cfg(test)]
pub use core::count_transactions;
