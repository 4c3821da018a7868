//! # Product Repository
//!
//! Database operations for the `products` collection.
//!
//! ## Key Operations
//! - Upsert-by-id (the sole write primitive)
//! - Lookup by id and by barcode
//! - Bulk delete by category (the cascade primitive invoked by the caller)

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use nabil_core::Product;

const PRODUCT_COLUMNS: &str = "id, name, price, quantity, category_id, barcode, image";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Returns every product, sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    ///
    /// Empty barcodes are never matched - many products legitimately have
    /// no barcode and would otherwise all collide on `""`.
    pub async fn get_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>> {
        if barcode.is_empty() {
            return Ok(None);
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 LIMIT 1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the products belonging to a category.
    pub async fn list_by_category(&self, category_id: &str) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = ?1 ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Upserts a product by id.
    ///
    /// An existing product with the same id is fully replaced (no
    /// partial-field merge); otherwise the product is inserted. The single
    /// statement makes the save atomic with respect to racing saves.
    pub async fn upsert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, quantity = product.quantity, "Upserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, quantity, category_id, barcode, image)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                quantity = excluded.quantity,
                category_id = excluded.category_id,
                barcode = excluded.barcode,
                image = excluded.image
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.price)
        .bind(product.quantity)
        .bind(&product.category_id)
        .bind(&product.barcode)
        .bind(&product.image)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the product with the given id. No-op when absent.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting product");

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes every product belonging to a category.
    ///
    /// This is the cascade primitive: the store does not enforce
    /// referential integrity, so the caller deleting a category invokes
    /// this explicitly alongside the category delete.
    ///
    /// ## Returns
    /// The number of products removed.
    pub async fn delete_by_category(&self, category_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE category_id = ?1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        debug!(category_id = %category_id, removed = result.rows_affected(), "Cascade-deleted products");

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use nabil_core::Product;

    fn product(id: &str, name: &str, quantity: i64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: "120".into(),
            quantity,
            category_id: "c1".into(),
            barcode: String::new(),
            image: String::new(),
        }
    }

    async fn store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_then_list_contains_exactly_one() {
        let store = store().await;
        let repo = store.products();

        repo.upsert(&product("p1", "Soap", 5)).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "p1");
        assert_eq!(all[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_upsert_same_id_replaces_without_duplicating() {
        let store = store().await;
        let repo = store.products();

        repo.upsert(&product("p1", "Soap", 5)).await.unwrap();
        repo.upsert(&product("p1", "Hand Soap", 8)).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Hand Soap");
        assert_eq!(all[0].quantity, 8);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let store = store().await;
        let repo = store.products();

        repo.delete("does-not-exist").await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_barcode_ignores_empty() {
        let store = store().await;
        let repo = store.products();

        let mut a = product("p1", "Soap", 5);
        a.barcode = String::new();
        repo.upsert(&a).await.unwrap();

        assert!(repo.get_by_barcode("").await.unwrap().is_none());

        let mut b = product("p2", "Cola", 2);
        b.barcode = "5449000000996".into();
        repo.upsert(&b).await.unwrap();

        let found = repo.get_by_barcode("5449000000996").await.unwrap().unwrap();
        assert_eq!(found.id, "p2");
    }

    #[tokio::test]
    async fn test_delete_by_category() {
        let store = store().await;
        let repo = store.products();

        repo.upsert(&product("p1", "Soap", 5)).await.unwrap();
        repo.upsert(&product("p2", "Shampoo", 2)).await.unwrap();

        let mut other = product("p3", "Cola", 9);
        other.category_id = "c2".into();
        repo.upsert(&other).await.unwrap();

        let removed = repo.delete_by_category("c1").await.unwrap();
        assert_eq!(removed, 2);

        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "p3");
    }
}
