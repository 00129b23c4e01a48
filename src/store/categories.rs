//! Category store
//!
//! Owner-scoped category rows. Every method takes the owner's user id,
//! so a cross-user id behaves exactly like a missing one.

use sqlx::SqlitePool;

/// A user-owned category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

/// Repository for category rows.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    pool: SqlitePool,
}

impl CategoryStore {
    /// Create a new CategoryStore
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's categories ordered by name, ties by id.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Category>, sqlx::Error> {
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(
            r#"
            SELECT id, user_id, name
            FROM categories
            WHERE user_id = ?
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, name)| Category { id, user_id, name })
            .collect())
    }

    pub async fn create(&self, user_id: i64, name: &str) -> Result<Category, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Category {
            id,
            user_id,
            name: name.to_string(),
        })
    }

    pub async fn find(&self, user_id: i64, id: i64) -> Result<Option<Category>, sqlx::Error> {
        let row: Option<(i64, i64, String)> = sqlx::query_as(
            r#"
            SELECT id, user_id, name
            FROM categories
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, user_id, name)| Category { id, user_id, name }))
    }

    /// Rename a category. None when the id is missing or not owned.
    pub async fn update_name(
        &self,
        user_id: i64,
        id: i64,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(name)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Ok(None);
        }

        Ok(Some(Category {
            id,
            user_id,
            name: name.to_string(),
        }))
    }

    /// Delete a category. False when the id is missing or not owned.
    /// Referencing transactions get their category nulled by the FK.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            DELETE FROM categories
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

    /// Ownership check used when a transaction references a category.
    pub async fn exists(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = ? AND user_id = ?)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
