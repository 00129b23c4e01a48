//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod reports;
pub mod transaction;

pub use amount::{Amount, AmountError};
pub use reports::{daily_expenses, expenses_distribution, ChartData, UNCATEGORIZED_LABEL};
pub use transaction::{Transaction, TransactionType, TransactionTypeError};
