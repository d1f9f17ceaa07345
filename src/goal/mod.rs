//! Savings goals: what the user is saving towards and how far along they are.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;
mod view_endpoint;

pub use core::{Goal, NewGoal, Priority, create_goal, create_goal_table, get_goals_for_user};
pub use create_endpoint::create_goal_endpoint;
pub use delete_endpoint::delete_goal_endpoint;
pub use edit_endpoint::edit_goal_endpoint;
pub use list_endpoint::list_goals_endpoint;
pub use view_endpoint::get_goal_endpoint;

#[cfg(test)]
pub use core::count_goals;
