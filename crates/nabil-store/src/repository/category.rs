//! # Category Repository
//!
//! Database operations for the `categories` collection.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use nabil_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Returns every category, sorted by name.
    ///
    /// An empty collection yields an empty vector, never an error.
    pub async fn list(&self) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, image FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Upserts a category by id.
    ///
    /// An existing category with the same id is fully replaced (no
    /// partial-field merge); otherwise the category is inserted.
    pub async fn upsert(&self, category: &Category) -> StoreResult<()> {
        debug!(id = %category.id, name = %category.name, "Upserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, image)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.image)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the category with the given id. No-op when absent.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting category");

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
