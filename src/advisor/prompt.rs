//! Builds the prompt sent to an [Advisor](super::Advisor).

use crate::{
    currency::format_currency,
    goal::Goal,
    report::{Totals, expenses_by_category},
    transaction::Transaction,
};

const INSTRUCTIONS: &str = "Analyze the user's financial goals and recent spending. \
Give 3 personalized financial advice suggestions. \
Be concise, practical, and friendly.";

/// The figures an advisor can ground its advice in.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    /// Totals over the recent transactions.
    pub totals: Totals,
    /// The category with the most spending, if there were any expenses.
    pub top_expense_category: Option<(String, f64)>,
    /// The user's goals, most important first.
    pub goals: Vec<Goal>,
    /// How many recent transactions the totals cover.
    pub transaction_count: usize,
}

/// A question from the user together with a summary of their finances.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorPrompt {
    /// What the user asked.
    pub user_message: String,
    /// The user's financial situation.
    pub summary: FinancialSummary,
    /// The full prompt as plain text, suitable for a language model.
    pub text: String,
}

impl AdvisorPrompt {
    /// Build a prompt from the user's message, goals and most recent transactions.
    pub fn new(user_message: &str, goals: Vec<Goal>, recent_transactions: &[Transaction]) -> Self {
        let top_expense_category = expenses_by_category(recent_transactions)
            .into_iter()
            .next()
            .map(|total| (total.category, total.amount));

        let summary = FinancialSummary {
            totals: Totals::from_transactions(recent_transactions),
            top_expense_category,
            goals,
            transaction_count: recent_transactions.len(),
        };

        let text = render_prompt(user_message, &summary, recent_transactions);

        Self {
            user_message: user_message.to_owned(),
            summary,
            text,
        }
    }
}

fn render_prompt(
    user_message: &str,
    summary: &FinancialSummary,
    recent_transactions: &[Transaction],
) -> String {
    let mut lines = vec![
        INSTRUCTIONS.to_owned(),
        String::new(),
        "Financial Summary:".to_owned(),
        format!("- Income: {}", format_currency(summary.totals.total_income)),
        format!(
            "- Expenses: {}",
            format_currency(summary.totals.total_expenses)
        ),
        format!(
            "- Net savings: {} ({:.0}% of income)",
            format_currency(summary.totals.net_savings),
            summary.totals.savings_rate
        ),
        String::new(),
        "Financial Goals:".to_owned(),
    ];

    if summary.goals.is_empty() {
        lines.push("- None yet".to_owned());
    }
    lines.extend(summary.goals.iter().map(|goal| {
        format!(
            "- {} ({} priority): Saved {} of {} by {}",
            goal.name,
            goal.priority,
            format_currency(goal.current_amount),
            format_currency(goal.target_amount),
            goal.target_date
        )
    }));

    lines.push(String::new());
    lines.push("Recent Transactions:".to_owned());
    if recent_transactions.is_empty() {
        lines.push("- None yet".to_owned());
    }
    lines.extend(recent_transactions.iter().map(|transaction| {
        let label = if transaction.description.is_empty() {
            &transaction.category
        } else {
            &transaction.description
        };

        format!(
            "- {} {label} ({}, {}): {}",
            transaction.date,
            transaction.category,
            transaction.transaction_type,
            format_currency(transaction.amount)
        )
    }));

    lines.push(String::new());
    lines.push(format!("User question: {user_message}"));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        goal::{Goal, Priority},
        transaction::{Transaction, TransactionType},
        user::UserId,
    };

    use super::AdvisorPrompt;

    fn goal() -> Goal {
        Goal {
            id: 1,
            user_id: UserId::new("u1").unwrap(),
            name: "Emergency fund".to_owned(),
            target_amount: 5000.0,
            current_amount: 1250.0,
            target_date: date!(2026 - 01 - 01),
            description: String::new(),
            priority: Priority::High,
            monthly_contribution: 200.0,
        }
    }

    fn transaction(transaction_type: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserId::new("u1").unwrap(),
            transaction_type,
            amount,
            category: category.to_owned(),
            date: date!(2025 - 05 - 01),
            description: String::new(),
            note: None,
        }
    }

    #[test]
    fn includes_goals_transactions_and_question() {
        let transactions = [
            transaction(TransactionType::Income, 3000.0, "Salary"),
            transaction(TransactionType::Expense, 1200.0, "Housing"),
        ];

        let prompt = AdvisorPrompt::new("How can I save more?", vec![goal()], &transactions);

        assert!(prompt.text.contains("Emergency fund (High priority): Saved $1,250.00 of $5,000.00"));
        assert!(prompt.text.contains("2025-05-01 Housing (Housing, expense): $1,200.00"));
        assert!(prompt.text.contains("- Net savings: $1,800.00 (60% of income)"));
        assert!(prompt.text.ends_with("User question: How can I save more?"));
        assert_eq!(prompt.user_message, "How can I save more?");
    }

    #[test]
    fn empty_sections_say_none_yet() {
        let prompt = AdvisorPrompt::new("Hi", vec![], &[]);

        assert!(prompt.text.contains(
            "Financial Goals:\n- None yet\n\nRecent Transactions:\n- None yet\n\nUser question: Hi"
        ));
        assert!(prompt.text.contains("friendly.\n\nFinancial Summary:\n- Income: $0.00\n"));
    }

    #[test]
    fn summary_picks_top_expense_category() {
        let transactions = [
            transaction(TransactionType::Expense, 20.0, "Food"),
            transaction(TransactionType::Expense, 90.0, "Transport"),
            transaction(TransactionType::Expense, 30.0, "Food"),
        ];

        let prompt = AdvisorPrompt::new("Where does my money go?", vec![], &transactions);

        assert_eq!(
            prompt.summary.top_expense_category,
            Some(("Transport".to_owned(), 90.0))
        );
        assert_eq!(prompt.summary.transaction_count, 3);
        assert!(prompt.text.contains("Financial Goals:\n- None yet"));
    }
}
