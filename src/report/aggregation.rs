//! Aggregates transactions and goals into summary figures.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    database_id::GoalId,
    goal::Goal,
    transaction::{Transaction, TransactionType},
};

/// Income and expense totals over a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses, as a positive number.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub net_savings: f64,
    /// Net savings as a percentage of income, 0 when there is no income.
    pub savings_rate: f64,
}

impl Totals {
    /// Sum up `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (total_income, total_expenses) = transactions.iter().fold(
            (0.0, 0.0),
            |(income, expenses), transaction| match transaction.transaction_type {
                TransactionType::Income => (income + transaction.amount, expenses),
                TransactionType::Expense => (income, expenses + transaction.amount),
            },
        );

        let net_savings = total_income - total_expenses;
        let savings_rate = if total_income > 0.0 {
            net_savings / total_income * 100.0
        } else {
            0.0
        };

        Self {
            total_income,
            total_expenses,
            net_savings,
            savings_rate,
        }
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The total spent, as a positive number.
    pub amount: f64,
}

/// Total the expenses in `transactions` by category, largest first.
///
/// Categories with equal totals are ordered by name.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
    {
        *totals.entry(transaction.category.as_str()).or_default() += transaction.amount;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_owned(),
            amount,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    totals
}

/// The income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// The month formatted as "YYYY-MM".
    pub month: String,
    /// The income received in the month.
    pub income: f64,
    /// The expenses paid in the month, as a positive number.
    pub expense: f64,
}

/// Total `transactions` by calendar month, oldest month first.
///
/// Months without any transactions are left out.
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u8), (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let key = (transaction.date.year(), transaction.date.month() as u8);
        let (income, expense) = months.entry(key).or_default();

        match transaction.transaction_type {
            TransactionType::Income => *income += transaction.amount,
            TransactionType::Expense => *expense += transaction.amount,
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlyTotal {
            month: format!("{year:04}-{month:02}"),
            income,
            expense,
        })
        .collect()
}

/// How far along a goal is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    /// The ID of the goal.
    pub id: GoalId,
    /// The name of the goal.
    pub name: String,
    /// The saved amount as a whole percentage of the target.
    pub progress_percentage: i64,
}

impl From<&Goal> for GoalProgress {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id,
            name: goal.name.clone(),
            progress_percentage: goal.progress_percentage(),
        }
    }
}

/// An overview of a user's finances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Income and expense totals.
    #[serde(flatten)]
    pub totals: Totals,
    /// Spending per category, largest first.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Income and expenses per month, oldest first.
    pub monthly: Vec<MonthlyTotal>,
    /// Progress towards each goal.
    pub goals: Vec<GoalProgress>,
}

/// Summarise `transactions` and `goals`.
pub fn summarise(transactions: &[Transaction], goals: &[Goal]) -> Summary {
    Summary {
        totals: Totals::from_transactions(transactions),
        expenses_by_category: expenses_by_category(transactions),
        monthly: monthly_totals(transactions),
        goals: goals.iter().map(GoalProgress::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        transaction::{Transaction, TransactionType},
        user::UserId,
    };

    use super::{CategoryTotal, MonthlyTotal, Totals, expenses_by_category, monthly_totals};

    fn transaction(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        date: Date,
    ) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserId::new("u1").unwrap(),
            transaction_type,
            amount,
            category: category.to_owned(),
            date,
            description: String::new(),
            note: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(TransactionType::Income, 4000.0, "Salary", date!(2025 - 01 - 15)),
            transaction(TransactionType::Expense, 1500.0, "Housing", date!(2025 - 01 - 01)),
            transaction(TransactionType::Expense, 250.0, "Food", date!(2025 - 01 - 20)),
            transaction(TransactionType::Expense, 250.0, "Transport", date!(2025 - 02 - 03)),
            transaction(TransactionType::Income, 1000.0, "Bonus", date!(2024 - 12 - 24)),
        ]
    }

    #[test]
    fn totals_income_and_expenses() {
        let totals = Totals::from_transactions(&sample());

        assert_eq!(
            totals,
            Totals {
                total_income: 5000.0,
                total_expenses: 2000.0,
                net_savings: 3000.0,
                savings_rate: 60.0,
            }
        );
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let totals = Totals::from_transactions(&[transaction(
            TransactionType::Expense,
            10.0,
            "Food",
            date!(2025 - 01 - 01),
        )]);

        assert_eq!(totals.savings_rate, 0.0);
        assert_eq!(totals.net_savings, -10.0);
    }

    #[test]
    fn categories_sorted_by_amount_then_name() {
        let got = expenses_by_category(&sample());

        assert_eq!(
            got,
            [
                CategoryTotal {
                    category: "Housing".to_owned(),
                    amount: 1500.0
                },
                CategoryTotal {
                    category: "Food".to_owned(),
                    amount: 250.0
                },
                CategoryTotal {
                    category: "Transport".to_owned(),
                    amount: 250.0
                },
            ]
        );
    }

    #[test]
    fn months_are_ascending() {
        let got = monthly_totals(&sample());

        assert_eq!(
            got,
            [
                MonthlyTotal {
                    month: "2024-12".to_owned(),
                    income: 1000.0,
                    expense: 0.0
                },
                MonthlyTotal {
                    month: "2025-01".to_owned(),
                    income: 4000.0,
                    expense: 1750.0
                },
                MonthlyTotal {
                    month: "2025-02".to_owned(),
                    income: 0.0,
                    expense: 250.0
                },
            ]
        );
    }
}
