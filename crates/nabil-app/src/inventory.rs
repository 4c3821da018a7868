//! # Inventory Operations
//!
//! The catalog and sale operations UI collaborators call into.
//!
//! ## Sale Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(product_id, quantity, unit_price)                          │
//! │                                                                         │
//! │  1. Validate quantity and unit price                                    │
//! │  2. Load the product; check stock                                       │
//! │  3. Append an immutable SaleRecord carrying the product name/image      │
//! │     frozen at sale time and the line total credited to earnings         │
//! │  4. Decrement stock:                                                    │
//! │       remaining > 0  → product saved with the new quantity              │
//! │       remaining <= 0 → product removed entirely                         │
//! │                        (no zero-stock products persist)                 │
//! │  5. Credit the earnings scalar by the line total                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a category cascades to its products here, in the caller - the
//! store itself does not enforce referential integrity.

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use nabil_core::{
    generate_id, next_timestamp, validation, Category, Product, SaleRecord,
};
use nabil_store::Store;

/// Catalog and sale operations over the local store.
#[derive(Debug, Clone)]
pub struct InventoryService {
    store: Store,
}

impl InventoryService {
    /// Creates the service over a store handle.
    pub fn new(store: Store) -> Self {
        InventoryService { store }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists all categories.
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.store.categories().list().await?)
    }

    /// Lists all products.
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.store.products().list().await?)
    }

    /// Lists the sale ledger, newest first.
    pub async fn list_sales(&self) -> AppResult<Vec<SaleRecord>> {
        Ok(self.store.sales().list().await?)
    }

    /// Returns the running earnings total.
    pub async fn earnings(&self) -> AppResult<f64> {
        Ok(self.store.scalars().earnings().await?)
    }

    /// Looks up a product by scanned barcode.
    pub async fn find_product_by_barcode(&self, barcode: &str) -> AppResult<Option<Product>> {
        Ok(self.store.products().get_by_barcode(barcode).await?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Upserts a category (validating first).
    pub async fn upsert_category(&self, category: &Category) -> AppResult<()> {
        validation::validate_category(category)?;
        self.store.categories().upsert(category).await?;
        Ok(())
    }

    /// Upserts a product (validating first).
    pub async fn upsert_product(&self, product: &Product) -> AppResult<()> {
        validation::validate_product(product)?;
        self.store.products().upsert(product).await?;
        Ok(())
    }

    /// Deletes a category and cascades to every product that references it.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let removed = self.store.products().delete_by_category(id).await?;
        self.store.categories().delete(id).await?;

        info!(category_id = %id, cascaded_products = removed, "Category deleted");
        Ok(())
    }

    /// Deletes a product. No-op when absent.
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        self.store.products().delete(id).await?;
        Ok(())
    }

    /// Records a sale of `quantity` units at `unit_price` each.
    ///
    /// Returns the appended ledger record. See the module docs for the
    /// full workflow.
    pub async fn record_sale(
        &self,
        product_id: &str,
        quantity: i64,
        unit_price: f64,
    ) -> AppResult<SaleRecord> {
        validation::validate_sale_quantity(quantity)?;

        if !(unit_price > 0.0 && unit_price.is_finite()) {
            return Err(AppError::validation("sale price must be positive"));
        }

        let product = self
            .store
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", product_id))?;

        if !product.can_sell(quantity) {
            return Err(nabil_core::CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            }
            .into());
        }

        let line_total = unit_price * quantity as f64;

        let record = SaleRecord {
            id: generate_id(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            quantity,
            sold_at_price: line_total,
            timestamp: next_timestamp(),
        };

        self.store.sales().append(&record).await?;

        let remaining = product.quantity - quantity;
        if remaining <= 0 {
            debug!(product_id = %product.id, "Stock exhausted, removing product");
            self.store.products().delete(&product.id).await?;
        } else {
            let mut updated = product.clone();
            updated.quantity = remaining;
            self.store.products().upsert(&updated).await?;
        }

        let earnings = self.store.scalars().earnings().await? + line_total;
        self.store.scalars().set_earnings(earnings).await?;

        info!(
            product = %product.name,
            quantity,
            line_total,
            earnings,
            "Sale recorded"
        );

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nabil_store::StoreConfig;

    async fn service() -> InventoryService {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        InventoryService::new(store)
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            image: String::new(),
        }
    }

    fn product(id: &str, name: &str, quantity: i64, category_id: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: "120/95".into(),
            quantity,
            category_id: category_id.into(),
            barcode: String::new(),
            image: "data:image/png;base64,xyz".into(),
        }
    }

    #[tokio::test]
    async fn test_deleting_a_category_cascades_to_its_products() {
        let service = service().await;

        service.upsert_category(&category("c1", "Drinks")).await.unwrap();
        service
            .upsert_product(&product("p1", "Cola", 3, "c1"))
            .await
            .unwrap();
        service
            .upsert_product(&product("p2", "Water", 9, "c1"))
            .await
            .unwrap();
        service
            .upsert_product(&product("p3", "Soap", 5, "c2"))
            .await
            .unwrap();

        service.delete_category("c1").await.unwrap();

        let products = service.list_products().await.unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p3"]);
        assert!(service.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selling_part_of_the_stock_decrements_quantity() {
        let service = service().await;
        service
            .upsert_product(&product("p1", "Cola", 3, "c1"))
            .await
            .unwrap();

        service.record_sale("p1", 1, 120.0).await.unwrap();

        let products = service.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_selling_all_stock_removes_the_product() {
        let service = service().await;
        service
            .upsert_product(&product("p1", "Cola", 3, "c1"))
            .await
            .unwrap();

        service.record_sale("p1", 3, 120.0).await.unwrap();

        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_freezes_product_fields_and_credits_earnings() {
        let service = service().await;
        service
            .upsert_product(&product("p1", "Cola", 5, "c1"))
            .await
            .unwrap();

        let record = service.record_sale("p1", 2, 100.0).await.unwrap();
        assert_eq!(record.product_name, "Cola");
        assert_eq!(record.product_image, "data:image/png;base64,xyz");
        assert_eq!(record.sold_at_price, 200.0);

        // Later edits do not touch the ledger record
        let mut renamed = product("p1", "Cola Zero", 3, "c1");
        renamed.image = String::new();
        service.upsert_product(&renamed).await.unwrap();

        let sales = service.list_sales().await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].product_name, "Cola");
        assert_eq!(sales[0].product_image, "data:image/png;base64,xyz");

        assert_eq!(service.earnings().await.unwrap(), 200.0);
    }

    #[tokio::test]
    async fn test_earnings_accumulate_across_sales() {
        let service = service().await;
        service
            .upsert_product(&product("p1", "Cola", 10, "c1"))
            .await
            .unwrap();

        service.record_sale("p1", 2, 100.0).await.unwrap();
        service.record_sale("p1", 1, 50.5).await.unwrap();

        assert_eq!(service.earnings().await.unwrap(), 250.5);

        let sales = service.list_sales().await.unwrap();
        let ledger_total: f64 = sales.iter().map(|s| s.sold_at_price).sum();
        assert_eq!(ledger_total, service.earnings().await.unwrap());
    }

    #[tokio::test]
    async fn test_overselling_is_rejected() {
        let service = service().await;
        service
            .upsert_product(&product("p1", "Cola", 3, "c1"))
            .await
            .unwrap();

        let err = service.record_sale("p1", 4, 120.0).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::BusinessLogic);

        // Nothing was written
        assert!(service.list_sales().await.unwrap().is_empty());
        assert_eq!(service.list_products().await.unwrap()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_selling_an_unknown_product_is_not_found() {
        let service = service().await;

        let err = service.record_sale("ghost", 1, 10.0).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_entities_are_rejected_before_storage() {
        let service = service().await;

        let err = service
            .upsert_category(&category("c1", "  "))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = service
            .upsert_product(&product("p1", "Cola", -1, "c1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = service.record_sale("p1", 0, 10.0).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_find_product_by_barcode() {
        let service = service().await;

        let mut scanned = product("p1", "Cola", 3, "c1");
        scanned.barcode = "5449000000996".into();
        service.upsert_product(&scanned).await.unwrap();

        let found = service
            .find_product_by_barcode("5449000000996")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "p1");

        assert!(service.find_product_by_barcode("").await.unwrap().is_none());
    }
}
