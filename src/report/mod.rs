//! Summary reports over a user's transactions and goals.

mod aggregation;
mod endpoint;

pub use aggregation::{Totals, expenses_by_category};
pub use endpoint::get_summary_report_endpoint;
