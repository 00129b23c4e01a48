//! Report aggregation
//!
//! Pure grouping and summation over a user's transactions. Handlers fetch
//! the rows and hand them here; nothing in this module touches the store.
//! Amounts accumulate as decimals and become floats only in the output.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Transaction, TransactionType};

/// Days covered by the daily expenses report, today included.
const DAILY_WINDOW_DAYS: usize = 30;

/// Label for expenses with no category in the distribution report and
/// the CSV export.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Parallel label/value series consumed by chart clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Sum expense amounts per day over the 30 calendar days ending at
/// `today`, oldest day first. Days without expenses report zero, so the
/// series always has exactly 30 points.
pub fn daily_expenses(today: NaiveDate, transactions: &[Transaction]) -> ChartData {
    let window_start = today - chrono::Duration::days(DAILY_WINDOW_DAYS as i64 - 1);

    let mut totals: HashMap<NaiveDate, Decimal> = HashMap::new();
    for txn in transactions {
        if txn.transaction_type != TransactionType::Expense {
            continue;
        }
        if txn.date < window_start || txn.date > today {
            continue;
        }
        *totals.entry(txn.date).or_default() += txn.amount.value();
    }

    let mut labels = Vec::with_capacity(DAILY_WINDOW_DAYS);
    let mut data = Vec::with_capacity(DAILY_WINDOW_DAYS);
    for day in window_start.iter_days().take(DAILY_WINDOW_DAYS) {
        labels.push(day.format("%m-%d").to_string());
        let total = totals.get(&day).copied().unwrap_or_default();
        data.push(total.to_f64().unwrap_or_default());
    }

    ChartData { labels, data }
}

/// Sum expense amounts per category name, expenses without a category
/// grouped under `Uncategorized`. Labels appear in the order a category is
/// first encountered, so callers pass transactions in ascending id order
/// to keep the output stable.
pub fn expenses_distribution(transactions: &[Transaction]) -> ChartData {
    let mut labels: Vec<String> = Vec::new();
    let mut totals: HashMap<String, Decimal> = HashMap::new();

    for txn in transactions {
        if txn.transaction_type != TransactionType::Expense {
            continue;
        }
        let label = txn
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
        if !totals.contains_key(&label) {
            labels.push(label.clone());
        }
        *totals.entry(label).or_default() += txn.amount.value();
    }

    let data = labels
        .iter()
        .map(|label| {
            totals
                .get(label)
                .copied()
                .unwrap_or_default()
                .to_f64()
                .unwrap_or_default()
        })
        .collect();

    ChartData { labels, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;
    use rust_decimal_macros::dec;

    fn expense(id: i64, date: &str, amount: Decimal, category: Option<&str>) -> Transaction {
        Transaction {
            id,
            user_id: 1,
            category_id: category.map(|_| id),
            amount: Amount::new(amount).unwrap(),
            transaction_type: TransactionType::Expense,
            date: date.parse().unwrap(),
            description: None,
            category_name: category.map(|c| c.to_string()),
        }
    }

    fn income(id: i64, date: &str, amount: Decimal) -> Transaction {
        Transaction {
            transaction_type: TransactionType::Income,
            ..expense(id, date, amount, None)
        }
    }

    #[test]
    fn test_daily_expenses_shape() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let report = daily_expenses(today, &[]);

        assert_eq!(report.labels.len(), 30);
        assert_eq!(report.data.len(), 30);
        assert!(report.data.iter().all(|&v| v == 0.0));
        assert_eq!(report.labels[0], "02-15");
        assert_eq!(report.labels[29], "03-15");
    }

    #[test]
    fn test_daily_expenses_sums_per_day() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let transactions = vec![
            expense(1, "2024-03-15", dec!(10.00), None),
            expense(2, "2024-03-15", dec!(2.50), None),
            expense(3, "2024-03-01", dec!(7.25), Some("Food")),
        ];
        let report = daily_expenses(today, &transactions);

        assert_eq!(report.data[29], 12.5);
        let march_first = report.labels.iter().position(|l| l == "03-01").unwrap();
        assert_eq!(report.data[march_first], 7.25);
        assert_eq!(report.data.iter().sum::<f64>(), 19.75);
    }

    #[test]
    fn test_daily_expenses_window_boundaries() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let transactions = vec![
            // 29 days before today, first day of the window
            expense(1, "2024-02-15", dec!(1.00), None),
            // 30 days before today, outside
            expense(2, "2024-02-14", dec!(100.00), None),
            // future-dated, outside
            expense(3, "2024-03-16", dec!(100.00), None),
        ];
        let report = daily_expenses(today, &transactions);

        assert_eq!(report.data[0], 1.0);
        assert_eq!(report.data.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_daily_expenses_ignores_income() {
        let today: NaiveDate = "2024-03-15".parse().unwrap();
        let transactions = vec![
            income(1, "2024-03-15", dec!(500.00)),
            expense(2, "2024-03-15", dec!(5.00), None),
        ];
        let report = daily_expenses(today, &transactions);

        assert_eq!(report.data[29], 5.0);
    }

    #[test]
    fn test_distribution_groups_by_category() {
        let transactions = vec![
            expense(1, "2024-03-01", dec!(10.00), Some("Food")),
            expense(2, "2024-03-02", dec!(20.00), Some("Rent")),
            expense(3, "2024-03-03", dec!(5.50), Some("Food")),
        ];
        let report = expenses_distribution(&transactions);

        assert_eq!(report.labels, vec!["Food", "Rent"]);
        assert_eq!(report.data, vec![15.5, 20.0]);
    }

    #[test]
    fn test_distribution_uncategorized() {
        let transactions = vec![expense(1, "2024-03-01", dec!(50.00), None)];
        let report = expenses_distribution(&transactions);

        assert_eq!(report.labels, vec!["Uncategorized"]);
        assert_eq!(report.data, vec![50.0]);
    }

    #[test]
    fn test_distribution_label_order_is_first_encounter() {
        let transactions = vec![
            expense(1, "2024-03-05", dec!(1.00), Some("Rent")),
            expense(2, "2024-03-01", dec!(2.00), None),
            expense(3, "2024-03-02", dec!(3.00), Some("Rent")),
            expense(4, "2024-03-03", dec!(4.00), Some("Food")),
        ];
        let report = expenses_distribution(&transactions);

        assert_eq!(report.labels, vec!["Rent", "Uncategorized", "Food"]);
        assert_eq!(report.data, vec![4.0, 2.0, 4.0]);
    }

    #[test]
    fn test_distribution_ignores_income() {
        let transactions = vec![
            income(1, "2024-03-01", dec!(900.00)),
            expense(2, "2024-03-01", dec!(30.00), Some("Food")),
        ];
        let report = expenses_distribution(&transactions);

        assert_eq!(report.labels, vec!["Food"]);
        assert_eq!(report.data, vec![30.0]);
    }
}
