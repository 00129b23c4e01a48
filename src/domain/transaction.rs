//! Transaction types
//!
//! The transaction entity and its income/expense discriminator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Amount;

/// Transaction kind discriminator, stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

/// Error for transaction type strings outside the allowed choices.
///
/// Display string is the exact message returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct TransactionTypeError(pub String);

impl TransactionType {
    /// Human-readable label used in CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = TransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(TransactionTypeError(other.to_string())),
        }
    }
}

// Row values come from a column with a CHECK constraint, so unknown
// strings cannot occur; fall back to expense rather than panic.
impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "income" => TransactionType::Income,
            _ => TransactionType::Expense,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// A stored transaction, including the joined category name.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert_eq!(
            "transfer".parse::<TransactionType>(),
            Err(TransactionTypeError("transfer".to_string()))
        );
    }

    #[test]
    fn test_transaction_type_error_message() {
        let err = "Expense".parse::<TransactionType>().unwrap_err();
        assert_eq!(err.to_string(), "\"Expense\" is not a valid choice.");
    }

    #[test]
    fn test_transaction_type_display() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(TransactionType::Expense.to_string(), "expense");
    }

    #[test]
    fn test_transaction_type_label() {
        assert_eq!(TransactionType::Income.label(), "Income");
        assert_eq!(TransactionType::Expense.label(), "Expense");
    }

    #[test]
    fn test_transaction_type_serde() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Income).unwrap(),
            "\"income\""
        );
        let parsed: TransactionType = serde_json::from_str("\"expense\"").unwrap();
        assert_eq!(parsed, TransactionType::Expense);
    }
}
