//! An advisor that answers from canned guidance chosen by keywords in the question.

use std::future;

use crate::{
    advisor::{AdviceFuture, Advisor, AdvisorPrompt, prompt::FinancialSummary},
    currency::format_currency,
};

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Putting money aside.
    Savings,
    /// Loans and credit.
    Debt,
    /// Planning spending, e.g. for a holiday.
    Budget,
    /// Stocks and other investments.
    Investing,
    /// Where the money is going.
    Expenses,
    /// Anything else.
    General,
}

impl Topic {
    /// Pick the topic of `message` from the first group of keywords it contains.
    pub fn from_message(message: &str) -> Self {
        const KEYWORDS: [(Topic, &[&str]); 5] = [
            (Topic::Savings, &["save", "saving"]),
            (Topic::Debt, &["debt", "loan", "credit"]),
            (Topic::Budget, &["budget", "vacation", "holiday"]),
            (Topic::Investing, &["invest", "stock"]),
            (Topic::Expenses, &["expense", "spend", "cost"]),
        ];

        let message = message.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| message.contains(keyword)))
            .map_or(Topic::General, |(topic, _)| *topic)
    }
}

/// Answers questions without calling out to a language model.
///
/// The answer is picked by [Topic] and filled in with the figures from the
/// prompt's [FinancialSummary].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAdvisor;

impl KeywordAdvisor {
    /// Pick and fill in the answer for `prompt`.
    pub fn answer(&self, prompt: &AdvisorPrompt) -> String {
        let summary = &prompt.summary;
        let topic = Topic::from_message(&prompt.user_message);
        tracing::debug!("Answering advisor question about {topic:?}");

        match topic {
            Topic::Savings => savings_advice(summary),
            Topic::Debt => debt_advice(summary),
            Topic::Budget => budget_advice(summary),
            Topic::Investing => investing_advice(summary),
            Topic::Expenses => expenses_advice(summary),
            Topic::General => general_advice(summary),
        }
    }
}

impl Advisor for KeywordAdvisor {
    fn advise<'a>(&'a self, prompt: &'a AdvisorPrompt) -> AdviceFuture<'a> {
        Box::pin(future::ready(Ok(self.answer(prompt))))
    }
}

fn savings_advice(summary: &FinancialSummary) -> String {
    let totals = &summary.totals;
    let suggested_transfer = totals.total_income * 0.15;

    let mut advice = format!(
        "Across your recent transactions you saved {} of {} income, a savings rate of {:.0}%. ",
        format_currency(totals.net_savings),
        format_currency(totals.total_income),
        totals.savings_rate
    );

    if totals.savings_rate < 15.0 && totals.total_income > 0.0 {
        advice.push_str(&format!(
            "Try setting up an automatic transfer of 15% of your income, about {}, \
            into a high-interest savings account as soon as you are paid.",
            format_currency(suggested_transfer)
        ));
    } else {
        advice.push_str(
            "That is a healthy rate. Keep automating your savings so they happen before you can spend them.",
        );
    }

    advice.push_str(&goal_nudge(summary));
    advice
}

fn debt_advice(summary: &FinancialSummary) -> String {
    let net = summary.totals.net_savings;

    if net > 0.0 {
        format!(
            "Focus on paying off your highest-interest debt first, such as credit cards. \
            Putting even half of your recent surplus of {} towards it each month will \
            shorten the time you spend paying interest.",
            format_currency(net)
        )
    } else {
        format!(
            "Your recent expenses exceed your income by {}, so any debt is likely to grow. \
            Make the minimum payments on everything, then cut spending until you have a \
            surplus to put towards the highest-interest debt.",
            format_currency(-net)
        )
    }
}

fn budget_advice(summary: &FinancialSummary) -> String {
    let mut advice = String::from(
        "Give every dollar a job: set a monthly limit for each spending category and \
        review it at the end of the month. ",
    );

    if let Some((category, amount)) = &summary.top_expense_category {
        advice.push_str(&format!(
            "Your biggest category recently was {category} at {}. \
            Trimming it by 10% would free up {} for your plans.",
            format_currency(*amount),
            format_currency(amount * 0.1)
        ));
    }

    advice.push_str(&goal_nudge(summary));
    advice
}

fn investing_advice(summary: &FinancialSummary) -> String {
    let mut advice = String::from(
        "Before investing, make sure you have an emergency fund covering three to six \
        months of expenses. After that, a diversified, low-cost index fund is a sensible \
        place to start, and retirement contributions are worth maximising first.",
    );

    if summary.totals.net_savings <= 0.0 {
        advice.push_str(
            " Right now you are not running a surplus, so build that first before investing.",
        );
    }

    advice
}

fn expenses_advice(summary: &FinancialSummary) -> String {
    let totals = &summary.totals;

    match &summary.top_expense_category {
        Some((category, amount)) => {
            let share = if totals.total_expenses > 0.0 {
                amount / totals.total_expenses * 100.0
            } else {
                0.0
            };

            format!(
                "You spent {} across your last {} transactions. {category} is your largest \
                category at {} ({share:.0}% of spending), so that is where small changes \
                will make the biggest difference. Check for subscriptions you no longer use too.",
                format_currency(totals.total_expenses),
                summary.transaction_count,
                format_currency(*amount),
            )
        }
        None => String::from(
            "You have no recent expenses recorded. Add your transactions so I can see where your money goes.",
        ),
    }
}

fn general_advice(summary: &FinancialSummary) -> String {
    let totals = &summary.totals;

    let mut advice = format!(
        "Recently you earned {} and spent {}, leaving {}. ",
        format_currency(totals.total_income),
        format_currency(totals.total_expenses),
        format_currency(totals.net_savings)
    );
    advice.push_str(
        "Ask me about saving, debt, budgeting, investing or your expenses for more specific suggestions.",
    );
    advice.push_str(&goal_nudge(summary));

    advice
}

/// A sentence about the most important unfinished goal, if there is one.
fn goal_nudge(summary: &FinancialSummary) -> String {
    summary
        .goals
        .iter()
        .find(|goal| goal.progress_percentage() < 100)
        .map(|goal| {
            format!(
                " Your {} goal is {}% of the way to {}; contributing {} a month keeps it on track.",
                goal.name,
                goal.progress_percentage(),
                format_currency(goal.target_amount),
                format_currency(goal.monthly_contribution)
            )
        })
        .unwrap_or_default()
}
