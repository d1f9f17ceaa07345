#![allow(missing_docs)]

use std::{future, sync::Arc};

use axum_test::TestServer;
use rusqlite::Connection;
use time::macros::date;

use crate::{
    AppState, Error, build_router,
    advisor::{AdviceFuture, Advisor, AdvisorConfig, AdvisorPrompt, KeywordAdvisor},
    goal::{Goal, NewGoal, Priority, count_goals, create_goal},
    pagination::PaginationConfig,
    transaction::{Transaction, TransactionType, count_transactions, create_transaction},
    user::UserId,
};

/// An advisor that always fails, for testing error handling.
#[derive(Debug)]
pub(crate) struct FailingAdvisor;

impl Advisor for FailingAdvisor {
    fn advise<'a>(&'a self, _prompt: &'a AdvisorPrompt) -> AdviceFuture<'a> {
        Box::pin(future::ready(Err(Error::AdvisorError(
            "the model is unavailable".to_owned(),
        ))))
    }
}

pub(crate) fn get_test_state(advisor: Arc<dyn Advisor>) -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        "Etc/UTC",
        PaginationConfig::default(),
        advisor,
        AdvisorConfig::default(),
    )
    .expect("Could not create app state.")
}

pub(crate) fn get_test_server_with_advisor(advisor: Arc<dyn Advisor>) -> (TestServer, AppState) {
    let state = get_test_state(advisor);
    let app = build_router(state.clone());
    let server = TestServer::try_new(app).expect("Could not create test server.");

    (server, state)
}

pub(crate) fn get_test_server() -> (TestServer, AppState) {
    get_test_server_with_advisor(Arc::new(KeywordAdvisor))
}

#[track_caller]
pub(crate) fn insert_transaction(
    state: &AppState,
    user_id: &str,
    transaction_type: TransactionType,
    amount: f64,
    category: &str,
) -> Transaction {
    let connection = state.db_connection.lock().unwrap();

    create_transaction(
        Transaction::build(
            UserId::new(user_id).unwrap(),
            transaction_type,
            amount,
            date!(2025 - 06 - 15),
        )
        .category(category),
        &connection,
    )
    .expect("Could not create test transaction.")
}

/// Insert a goal that is 25% of the way to its target.
#[track_caller]
pub(crate) fn insert_goal(state: &AppState, user_id: &str, name: &str, priority: Priority) -> Goal {
    let connection = state.db_connection.lock().unwrap();

    create_goal(
        NewGoal {
            user_id: UserId::new(user_id).unwrap(),
            name: name.to_owned(),
            target_amount: 2000.0,
            current_amount: 500.0,
            target_date: date!(2026 - 12 - 31),
            description: "Test goal".to_owned(),
            priority,
            monthly_contribution: 100.0,
        },
        &connection,
    )
    .expect("Could not create test goal.")
}

#[track_caller]
pub(crate) fn transaction_count(state: &AppState) -> u32 {
    count_transactions(&state.db_connection.lock().unwrap()).unwrap()
}

#[track_caller]
pub(crate) fn goal_count(state: &AppState) -> u32 {
    count_goals(&state.db_connection.lock().unwrap()).unwrap()
}
