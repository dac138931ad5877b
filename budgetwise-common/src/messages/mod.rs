use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::aggregate::{self, LoadedBudget};
use crate::models;
use crate::money::Money;

#[derive(Debug)]
pub enum MessageError {
    InvalidTimestamp,
}

impl std::error::Error for MessageError {}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageError::InvalidTimestamp => write!(f, "Invalid timestamp"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = MessageError;

    fn try_from(timestamp: SystemTime) -> Result<Self, Self::Error> {
        let since_unix_epoch = timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| MessageError::InvalidTimestamp)?;

        Ok(Timestamp {
            secs: since_unix_epoch.as_secs(),
            nanos: since_unix_epoch.subsec_nanos(),
        })
    }
}

// Requests

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewBudget {
    pub name: String,
    pub amount: Money,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Money,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

// Responses

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserEnsured {
    pub user_id: Uuid,
    pub created: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetId {
    pub id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionId {
    pub id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub amount: Money,
    pub description: String,
    pub emoji: Option<String>,
    pub created_timestamp: Timestamp,
}

impl From<models::transaction::Transaction> for Transaction {
    fn from(t: models::transaction::Transaction) -> Self {
        Transaction {
            id: t.id,
            budget_id: t.budget_id,
            amount: Money::from_cents(t.amount_cents),
            description: t.description,
            emoji: t.emoji,
            created_timestamp: t.created_timestamp.try_into().unwrap_or_default(),
        }
    }
}

/// A transaction annotated with the name of the budget it was recorded against
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithBudget {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub budget_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<TransactionWithBudget>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub amount: Money,
    pub emoji: Option<String>,
    pub created_timestamp: Timestamp,

    pub total_spent: Money,
    pub remaining: Money,
    pub progress_percent: u8,

    pub transactions: Vec<Transaction>,
}

impl From<LoadedBudget> for Budget {
    fn from(loaded: LoadedBudget) -> Self {
        let total_spent = loaded.total_spent();
        let remaining = loaded.remaining();
        let progress_percent = loaded.progress_percent();

        let LoadedBudget {
            budget,
            transactions,
        } = loaded;

        Budget {
            id: budget.id,
            name: budget.name,
            amount: Money::from_cents(budget.amount_cents),
            emoji: budget.emoji,
            created_timestamp: budget.created_timestamp.try_into().unwrap_or_default(),
            total_spent,
            remaining,
            progress_percent,
            transactions: transactions.into_iter().map(Transaction::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetList {
    pub budgets: Vec<Budget>,
}

impl From<Vec<LoadedBudget>> for BudgetList {
    fn from(loaded: Vec<LoadedBudget>) -> Self {
        BudgetList {
            budgets: loaded.into_iter().map(Budget::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TotalSpent {
    pub total_spent: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionCount {
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedBudgets {
    pub reached: u64,
    pub total: u64,
    /// Formatted as `<reached>/<total>`
    pub ratio: String,
}

impl From<aggregate::ReachedRatio> for ReachedBudgets {
    fn from(ratio: aggregate::ReachedRatio) -> Self {
        ReachedBudgets {
            reached: ratio.reached,
            total: ratio.total,
            ratio: ratio.to_string(),
        }
    }
}

/// One bar of the dashboard chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStats {
    pub budget_name: String,
    pub total_budget_amount: Money,
    pub total_transaction: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetStatsList {
    pub stats: Vec<BudgetStats>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_spent: Money,
    pub transaction_count: u64,
    pub reached_budgets: ReachedBudgets,
    pub budget_stats: Vec<BudgetStats>,
    pub recent_transactions: Vec<TransactionWithBudget>,
    pub recent_budgets: Vec<Budget>,
}

// Errors

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    IncorrectlyFormed,
    InvalidPeriod,
    SpendLimitExceeded,
    IdentityMissing,
    UserDoesNotExist,
    BudgetDoesNotExist,
    TransactionDoesNotExist,
    InputTooLarge,
    InternalError,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerErrorResponse {
    pub err_type: ErrorType,
    pub err_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_timestamp_conversion() {
        let time = SystemTime::UNIX_EPOCH + Duration::new(1_700_000_000, 250);
        let timestamp = Timestamp::try_from(time).unwrap();

        assert_eq!(
            timestamp,
            Timestamp {
                secs: 1_700_000_000,
                nanos: 250
            }
        );

        let before_epoch = SystemTime::UNIX_EPOCH - Duration::from_secs(1);
        assert!(Timestamp::try_from(before_epoch).is_err());
    }

    #[test]
    fn test_new_budget_emoji_is_optional() {
        let budget: NewBudget =
            serde_json::from_value(json!({ "name": "Groceries", "amount": 50000 })).unwrap();

        assert_eq!(budget.name, "Groceries");
        assert_eq!(budget.amount, Money::from_cents(50000));
        assert!(budget.emoji.is_none());
    }

    #[test]
    fn test_transaction_with_budget_is_flattened() {
        let budget_id = Uuid::now_v7();
        let message = TransactionWithBudget {
            transaction: Transaction {
                id: Uuid::now_v7(),
                budget_id,
                amount: Money::from_cents(1250),
                description: String::from("Market"),
                emoji: None,
                created_timestamp: Timestamp { secs: 10, nanos: 0 },
            },
            budget_name: String::from("Groceries"),
        };

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["budget_name"], "Groceries");
        assert_eq!(value["budget_id"], budget_id.to_string());
        assert_eq!(value["amount"], 1250);
        assert!(value.get("transaction").is_none());
    }

    #[test]
    fn test_error_type_serializes_snake_case() {
        let resp = ServerErrorResponse {
            err_type: ErrorType::SpendLimitExceeded,
            err_message: String::from("nope"),
        };

        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "err_type": "spend_limit_exceeded", "err_message": "nope" })
        );
    }
}
