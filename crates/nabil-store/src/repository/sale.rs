//! # Sale Repository
//!
//! Database operations for the append-only `sales` ledger.
//!
//! Sale records are never mutated or deleted by normal operation - the only
//! writes besides `append` are the full replacement during snapshot import
//! and the wipe on sign-out.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use nabil_core::SaleRecord;

const SALE_COLUMNS: &str =
    "id, product_id, product_name, product_image, quantity, sold_at_price, timestamp";

/// Repository for sale ledger operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Returns the full ledger, newest first.
    pub async fn list(&self) -> StoreResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY timestamp DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Appends a sale record to the ledger.
    ///
    /// Upsert semantics by id, matching the other collections, though in
    /// practice ids are fresh and records are only ever appended.
    pub async fn append(&self, sale: &SaleRecord) -> StoreResult<()> {
        debug!(
            id = %sale.id,
            product_id = %sale.product_id,
            quantity = sale.quantity,
            sold_at_price = sale.sold_at_price,
            "Appending sale record"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (id, product_id, product_name, product_image, quantity, sold_at_price, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                product_id = excluded.product_id,
                product_name = excluded.product_name,
                product_image = excluded.product_image,
                quantity = excluded.quantity,
                sold_at_price = excluded.sold_at_price,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(&sale.product_image)
        .bind(sale.quantity)
        .bind(sale.sold_at_price)
        .bind(sale.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use nabil_core::SaleRecord;

    fn sale(id: &str, timestamp: i64) -> SaleRecord {
        SaleRecord {
            id: id.into(),
            product_id: "p1".into(),
            product_name: "Soap".into(),
            product_image: String::new(),
            quantity: 1,
            sold_at_price: 50.0,
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_ledger_lists_newest_first() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.sales();

        repo.append(&sale("s1", 1_000)).await.unwrap();
        repo.append(&sale("s2", 3_000)).await.unwrap();
        repo.append(&sale("s3", 2_000)).await.unwrap();

        let ledger = repo.list().await.unwrap();
        let ids: Vec<&str> = ledger.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s2", "s3", "s1"]);
    }
}
