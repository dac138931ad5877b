//! Reductions over a user's budgets and their transactions.
//!
//! Everything here operates on rows that have already been loaded, so the
//! dashboard numbers for one request all come from the same snapshot.

use std::fmt;

use crate::messages::{
    self, BudgetStats, DashboardSummary, ReachedBudgets, TransactionWithBudget,
};
use crate::models::budget::Budget;
use crate::models::transaction::Transaction;
use crate::money::Money;

#[derive(Clone, Debug)]
pub struct LoadedBudget {
    pub budget: Budget,
    pub transactions: Vec<Transaction>,
}

impl LoadedBudget {
    pub fn target(&self) -> Money {
        Money::from_cents(self.budget.amount_cents)
    }

    pub fn total_spent(&self) -> Money {
        self.transactions
            .iter()
            .map(|t| Money::from_cents(t.amount_cents))
            .sum()
    }

    /// A budget is reached once its spend meets or exceeds its target
    pub fn is_reached(&self) -> bool {
        self.total_spent() >= self.target()
    }

    pub fn remaining(&self) -> Money {
        self.target().saturating_sub_to_zero(self.total_spent())
    }

    /// Spend as a whole percentage of the target, capped at 100
    pub fn progress_percent(&self) -> u8 {
        let target = self.target().cents();
        if target <= 0 {
            return 100;
        }

        let spent = self.total_spent().cents().max(0) as i128;
        let percent = spent * 100 / target as i128;

        percent.min(100) as u8
    }
}

pub fn total_spent(budgets: &[LoadedBudget]) -> Money {
    budgets.iter().map(LoadedBudget::total_spent).sum()
}

pub fn transaction_count(budgets: &[LoadedBudget]) -> u64 {
    budgets.iter().map(|b| b.transactions.len() as u64).sum()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReachedRatio {
    pub reached: u64,
    pub total: u64,
}

impl fmt::Display for ReachedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.reached, self.total)
    }
}

pub fn reached_ratio(budgets: &[LoadedBudget]) -> ReachedRatio {
    ReachedRatio {
        reached: budgets.iter().filter(|b| b.is_reached()).count() as u64,
        total: budgets.len() as u64,
    }
}

pub fn budget_stats(budgets: &[LoadedBudget]) -> Vec<BudgetStats> {
    budgets
        .iter()
        .map(|b| BudgetStats {
            budget_name: b.budget.name.clone(),
            total_budget_amount: b.target(),
            total_transaction: b.total_spent(),
        })
        .collect()
}

pub const RECENT_TRANSACTIONS_LIMIT: usize = 10;
pub const RECENT_BUDGETS_LIMIT: usize = 3;

/// The newest transactions across all budgets, each tagged with its budget's name
pub fn recent_transactions(budgets: &[LoadedBudget], limit: usize) -> Vec<TransactionWithBudget> {
    let mut all = budgets
        .iter()
        .flat_map(|b| b.transactions.iter().map(move |t| (t, &b.budget.name)))
        .collect::<Vec<_>>();

    all.sort_unstable_by(|(a, _), (b, _)| {
        b.created_timestamp
            .cmp(&a.created_timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });

    all.into_iter()
        .take(limit)
        .map(|(t, budget_name)| TransactionWithBudget {
            transaction: messages::Transaction::from(t.clone()),
            budget_name: budget_name.clone(),
        })
        .collect()
}

pub fn recent_budgets(mut budgets: Vec<LoadedBudget>, limit: usize) -> Vec<LoadedBudget> {
    budgets.sort_unstable_by(|a, b| {
        b.budget
            .created_timestamp
            .cmp(&a.budget.created_timestamp)
            .then_with(|| b.budget.id.cmp(&a.budget.id))
    });
    budgets.truncate(limit);
    budgets
}

pub fn dashboard_summary(budgets: Vec<LoadedBudget>) -> DashboardSummary {
    let total_spent = total_spent(&budgets);
    let transaction_count = transaction_count(&budgets);
    let reached_budgets = ReachedBudgets::from(reached_ratio(&budgets));
    let budget_stats = budget_stats(&budgets);
    let recent_transactions = recent_transactions(&budgets, RECENT_TRANSACTIONS_LIMIT);
    let recent_budgets = recent_budgets(budgets, RECENT_BUDGETS_LIMIT)
        .into_iter()
        .map(messages::Budget::from)
        .collect();

    DashboardSummary {
        total_spent,
        transaction_count,
        reached_budgets,
        budget_stats,
        recent_transactions,
        recent_budgets,
    }
}

/// Rejects a new transaction that would push a budget's spend past its target.
///
/// Landing exactly on the target is allowed.
pub fn check_spend_limit(
    target: Money,
    current_spent: Money,
    new_amount: Money,
) -> Result<(), SpendLimitError> {
    match current_spent.checked_add(new_amount) {
        Some(total) if total <= target => Ok(()),
        _ => Err(SpendLimitError {
            target,
            current_spent,
            requested: new_amount,
        }),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpendLimitError {
    pub target: Money,
    pub current_spent: Money,
    pub requested: Money,
}

impl std::error::Error for SpendLimitError {}

impl fmt::Display for SpendLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Adding {} would bring total spend to more than the budget amount of {} \
             ({} already spent)",
            self.requested, self.target, self.current_spent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{Duration, SystemTime};
    use uuid::Uuid;

    fn budget(name: &str, amount_cents: i64, spends: &[i64]) -> LoadedBudget {
        let budget_id = Uuid::now_v7();
        let now = SystemTime::now();

        let transactions = spends
            .iter()
            .enumerate()
            .map(|(i, cents)| Transaction {
                id: Uuid::now_v7(),
                budget_id,
                amount_cents: *cents,
                description: format!("expense {i}"),
                emoji: Some(String::from("🛒")),
                created_timestamp: now - Duration::from_secs(i as u64 * 60),
            })
            .collect();

        LoadedBudget {
            budget: Budget {
                id: budget_id,
                user_id: Uuid::now_v7(),
                name: String::from(name),
                amount_cents,
                emoji: Some(String::from("🛒")),
                created_timestamp: now,
            },
            transactions,
        }
    }

    #[test]
    fn test_check_spend_limit_rejects_overflowing_transaction() {
        let result = check_spend_limit(
            Money::from_cents(1000),
            Money::from_cents(800),
            Money::from_cents(300),
        );

        assert_eq!(
            result,
            Err(SpendLimitError {
                target: Money::from_cents(1000),
                current_spent: Money::from_cents(800),
                requested: Money::from_cents(300),
            })
        );
    }

    #[test]
    fn test_check_spend_limit_allows_exact_target() {
        assert!(check_spend_limit(
            Money::from_cents(1000),
            Money::from_cents(800),
            Money::from_cents(200)
        )
        .is_ok());
        assert!(check_spend_limit(
            Money::from_cents(1000),
            Money::zero(),
            Money::from_cents(999)
        )
        .is_ok());
    }

    #[test]
    fn test_check_spend_limit_treats_overflow_as_exceeded() {
        assert!(check_spend_limit(
            Money::from_cents(i64::MAX),
            Money::from_cents(i64::MAX),
            Money::from_cents(1)
        )
        .is_err());
    }

    #[test]
    fn test_spend_limit_error_message() {
        let err = SpendLimitError {
            target: Money::from_cents(100000),
            current_spent: Money::from_cents(80000),
            requested: Money::from_cents(30000),
        };

        assert_eq!(
            err.to_string(),
            "Adding 300.00 would bring total spend to more than the budget amount of 1000.00 \
             (800.00 already spent)"
        );
    }

    #[test]
    fn test_reached_ratio() {
        let budgets = vec![
            budget("Groceries", 1000, &[400, 600]),
            budget("Rent", 5000, &[100]),
            budget("Fun", 300, &[]),
        ];

        let ratio = reached_ratio(&budgets);
        assert_eq!(ratio, ReachedRatio { reached: 1, total: 3 });
        assert_eq!(ratio.to_string(), "1/3");
    }

    #[test]
    fn test_reached_ratio_with_no_budgets() {
        assert_eq!(reached_ratio(&[]).to_string(), "0/0");
    }

    #[test]
    fn test_totals_across_budgets() {
        let budgets = vec![
            budget("Groceries", 1000, &[400, 250]),
            budget("Rent", 5000, &[1200]),
            budget("Fun", 300, &[]),
        ];

        assert_eq!(total_spent(&budgets), Money::from_cents(1850));
        assert_eq!(transaction_count(&budgets), 3);
        assert_eq!(total_spent(&[]), Money::zero());
        assert_eq!(transaction_count(&[]), 0);
    }

    #[test]
    fn test_totals_saturate_across_budgets_at_max_amounts() {
        let budgets = vec![
            budget("Savings", i64::MAX, &[i64::MAX]),
            budget("Pension", i64::MAX, &[i64::MAX]),
        ];

        assert!(budgets.iter().all(LoadedBudget::is_reached));
        assert_eq!(total_spent(&budgets), Money::from_cents(i64::MAX));

        let summary = dashboard_summary(budgets);
        assert_eq!(summary.total_spent, Money::from_cents(i64::MAX));
        assert_eq!(summary.reached_budgets.ratio, "2/2");
    }

    #[test]
    fn test_budget_stats() {
        let budgets = vec![
            budget("Groceries", 1000, &[400, 250]),
            budget("Fun", 300, &[]),
        ];

        let stats = budget_stats(&budgets);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].budget_name, "Groceries");
        assert_eq!(stats[0].total_budget_amount, Money::from_cents(1000));
        assert_eq!(stats[0].total_transaction, Money::from_cents(650));
        assert_eq!(stats[1].budget_name, "Fun");
        assert_eq!(stats[1].total_transaction, Money::zero());
    }

    #[test]
    fn test_recent_transactions_caps_at_limit() {
        let budgets = vec![
            budget("Groceries", 100000, &[1, 2, 3, 4, 5, 6, 7]),
            budget("Rent", 100000, &[8, 9, 10, 11, 12, 13]),
        ];

        let recent = recent_transactions(&budgets, RECENT_TRANSACTIONS_LIMIT);
        assert_eq!(recent.len(), RECENT_TRANSACTIONS_LIMIT);

        let few = vec![budget("Fun", 100, &[5, 6])];
        assert_eq!(recent_transactions(&few, RECENT_TRANSACTIONS_LIMIT).len(), 2);
        assert!(recent_transactions(&[], RECENT_TRANSACTIONS_LIMIT).is_empty());
    }

    #[test]
    fn test_recent_transactions_newest_first_with_budget_name() {
        let mut groceries = budget("Groceries", 100000, &[100]);
        let mut rent = budget("Rent", 100000, &[200]);

        let now = SystemTime::now();
        groceries.transactions[0].created_timestamp = now - Duration::from_secs(3600);
        rent.transactions[0].created_timestamp = now;

        let recent = recent_transactions(&[groceries, rent], 10);

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].budget_name, "Rent");
        assert_eq!(recent[0].transaction.amount, Money::from_cents(200));
        assert_eq!(recent[1].budget_name, "Groceries");
    }

    #[test]
    fn test_recent_budgets() {
        let now = SystemTime::now();
        let mut budgets = Vec::new();
        for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            let mut b = budget(name, 1000, &[]);
            b.budget.created_timestamp = now - Duration::from_secs(86400 * (5 - i as u64));
            budgets.push(b);
        }

        let recent = recent_budgets(budgets, RECENT_BUDGETS_LIMIT);
        let names = recent
            .iter()
            .map(|b| b.budget.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["E", "D", "C"]);
    }

    #[test]
    fn test_dashboard_summary() {
        let budgets = vec![
            budget("Groceries", 1000, &[400, 600]),
            budget("Rent", 5000, &[100]),
            budget("Fun", 300, &[]),
            budget("Travel", 300, &[]),
        ];

        let summary = dashboard_summary(budgets);

        assert_eq!(summary.total_spent, Money::from_cents(1100));
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.reached_budgets.ratio, "1/4");
        assert_eq!(summary.budget_stats.len(), 4);
        assert_eq!(summary.recent_transactions.len(), 3);
        assert_eq!(summary.recent_budgets.len(), RECENT_BUDGETS_LIMIT);
    }

    #[test]
    fn test_progress() {
        let b = budget("Groceries", 1000, &[250]);
        assert_eq!(b.progress_percent(), 25);
        assert_eq!(b.remaining(), Money::from_cents(750));
        assert!(!b.is_reached());

        let b = budget("Groceries", 1000, &[600, 400]);
        assert_eq!(b.progress_percent(), 100);
        assert_eq!(b.remaining(), Money::zero());
        assert!(b.is_reached());

        let b = budget("Empty", 3, &[1]);
        assert_eq!(b.progress_percent(), 33);
    }
}
