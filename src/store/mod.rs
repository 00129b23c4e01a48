//! Store module
//!
//! Owner-scoped persistence over SQLite. Every category and transaction
//! method takes the owner's user id, keeping unscoped queries out of the
//! codebase entirely.

use sqlx::SqlitePool;

pub mod categories;
pub mod transactions;
pub mod users;

pub use categories::{Category, CategoryStore};
pub use transactions::{NewTransaction, TransactionStore};
pub use users::{User, UserStore};

/// Delete all of one user's transactions, then all of their categories,
/// as a single database transaction. Either both deletes commit or
/// neither does.
pub async fn reset_user_data(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM transactions WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM categories WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, TransactionType};
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        pool
    }

    async fn seed(pool: &SqlitePool, username: &str) -> i64 {
        let user = UserStore::new(pool.clone())
            .create(username, "hash")
            .await
            .unwrap();
        let category = CategoryStore::new(pool.clone())
            .create(user.id, "Food")
            .await
            .unwrap();
        TransactionStore::new(pool.clone())
            .create(
                user.id,
                &NewTransaction {
                    category_id: Some(category.id),
                    amount: Amount::new(dec!(10)).unwrap(),
                    transaction_type: TransactionType::Expense,
                    date: "2024-01-01".parse().unwrap(),
                    description: None,
                },
            )
            .await
            .unwrap();
        user.id
    }

    #[tokio::test]
    async fn test_reset_clears_only_the_callers_rows() {
        let pool = test_pool().await;
        let alice = seed(&pool, "alice").await;
        let bob = seed(&pool, "bob").await;

        reset_user_data(&pool, alice).await.unwrap();

        let categories = CategoryStore::new(pool.clone());
        let transactions = TransactionStore::new(pool.clone());

        assert!(categories.list(alice).await.unwrap().is_empty());
        assert!(transactions.list(alice).await.unwrap().is_empty());

        assert_eq!(categories.list(bob).await.unwrap().len(), 1);
        assert_eq!(transactions.list(bob).await.unwrap().len(), 1);
    }
}
