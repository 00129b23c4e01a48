//! Transaction store
//!
//! Owner-scoped transaction rows, joined with the category name the API
//! serializes. Amounts are stored as TEXT at scale 2 and parsed back
//! into `Amount` on the way out.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::domain::{Amount, Transaction, TransactionType};

/// Validated field set for inserting or fully updating a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category_id: Option<i64>,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub description: Option<String>,
}

type TransactionRow = (
    i64,
    i64,
    Option<i64>,
    String,
    String,
    NaiveDate,
    Option<String>,
    Option<String>,
);

fn map_row(row: TransactionRow) -> Result<Transaction, sqlx::Error> {
    let (id, user_id, category_id, amount, transaction_type, date, description, category_name) =
        row;
    let amount = amount
        .parse::<Amount>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Transaction {
        id,
        user_id,
        category_id,
        amount,
        transaction_type: TransactionType::from(transaction_type),
        date,
        description,
        category_name,
    })
}

const SELECT_COLUMNS: &str = r#"
    SELECT t.id, t.user_id, t.category_id, t.amount, t.transaction_type,
           t.date, t.description, c.name
    FROM transactions t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// Repository for transaction rows.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    pool: SqlitePool,
}

impl TransactionStore {
    /// Create a new TransactionStore
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's transactions, newest date first, ties by id
    /// descending. The same ordering backs the list endpoint and both
    /// exports.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE t.user_id = ? ORDER BY t.date DESC, t.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row).collect()
    }

    /// List the owner's transactions in creation (ascending id) order.
    /// Report aggregation relies on this for stable label ordering.
    pub async fn list_by_id(&self, user_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE t.user_id = ? ORDER BY t.id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row).collect()
    }

    pub async fn find(&self, user_id: i64, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE t.id = ? AND t.user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_row).transpose()
    }

    pub async fn create(
        &self,
        user_id: i64,
        new: &NewTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (user_id, category_id, amount, transaction_type, date, description)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(new.category_id)
        .bind(new.amount.to_string())
        .bind(new.transaction_type.to_string())
        .bind(new.date)
        .bind(new.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        // Reread to pick up the joined category name
        self.find(user_id, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite all mutable fields. None when the id is missing or not
    /// owned.
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        new: &NewTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            UPDATE transactions
            SET category_id = ?, amount = ?, transaction_type = ?, date = ?, description = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(new.category_id)
        .bind(new.amount.to_string())
        .bind(new.transaction_type.to_string())
        .bind(new.date)
        .bind(new.description.as_deref())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Ok(None);
        }

        self.find(user_id, id).await
    }

    /// Delete a transaction. False when the id is missing or not owned.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            DELETE FROM transactions
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}
