//! Financial advice based on a user's goals and recent transactions.
//!
//! The endpoint gathers the user's data into an [AdvisorPrompt] and hands it to
//! whichever [Advisor] the server was started with.

use std::{fmt::Debug, future::Future, pin::Pin};

use crate::Error;

mod endpoint;
mod keyword;
mod prompt;

pub use endpoint::get_advice_endpoint;
pub use keyword::KeywordAdvisor;
pub use prompt::AdvisorPrompt;

/// The advice an [Advisor] eventually produces.
pub type AdviceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, Error>> + Send + 'a>>;

/// Something that can answer a user's financial question.
///
/// Advice is returned as a future so implementations that call a remote
/// model can await the response without holding up a runtime worker.
pub trait Advisor: Debug + Send + Sync {
    /// Produce advice for `prompt`.
    ///
    /// # Errors
    /// Implementations should resolve to [Error::AdvisorError] when no advice can be produced.
    fn advise<'a>(&'a self, prompt: &'a AdvisorPrompt) -> AdviceFuture<'a>;
}

/// The config for what the advisor is told about a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// How many of the user's most recent transactions to include in the prompt.
    pub recent_transactions: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            recent_transactions: 20,
        }
    }
}
