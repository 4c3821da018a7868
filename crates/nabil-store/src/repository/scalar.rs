//! # Scalar Repository
//!
//! The values that are not collections: the running earnings total, the
//! signed-in identity record, and the last successful sync time.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scalars table: (name TEXT PRIMARY KEY, value TEXT)                     │
//! │                                                                         │
//! │    "earnings"   →  "1250.5"          (decimal as text)                  │
//! │    "session"    →  "{\"email\":..}"  (identity record as JSON)          │
//! │    "last_sync"  →  "1700000000500"   (epoch milliseconds)               │
//! │                                                                         │
//! │  The earnings scalar is the source of truth for the running total:      │
//! │  recordSale keeps it consistent with the ledger instead of deriving     │
//! │  it on every read.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use nabil_core::Identity;

/// Scalar names. Fixed: these appear in persisted databases.
pub const EARNINGS: &str = "earnings";
pub const SESSION: &str = "session";
pub const LAST_SYNC: &str = "last_sync";

/// Repository for the scalar values.
#[derive(Debug, Clone)]
pub struct ScalarRepository {
    pool: SqlitePool,
}

impl ScalarRepository {
    /// Creates a new ScalarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ScalarRepository { pool }
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Gets a raw scalar value by name.
    pub async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM scalars WHERE name = ?1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.map(|(v,)| v))
    }

    /// Sets a raw scalar value by name (full replacement).
    pub async fn set(&self, name: &str, value: &str) -> StoreResult<()> {
        debug!(name = %name, "Setting scalar");

        sqlx::query(
            r#"
            INSERT INTO scalars (name, value)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a scalar by name. No-op when absent.
    pub async fn remove(&self, name: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM scalars WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    /// Returns the running earnings total (0 when never set).
    pub async fn earnings(&self) -> StoreResult<f64> {
        let earnings = self
            .get(EARNINGS)
            .await?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(earnings)
    }

    /// Sets the running earnings total.
    pub async fn set_earnings(&self, amount: f64) -> StoreResult<()> {
        self.set(EARNINGS, &amount.to_string()).await
    }

    /// Returns the persisted identity record, if signed in.
    pub async fn identity(&self) -> StoreResult<Option<Identity>> {
        match self.get(SESSION).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Persists the identity record.
    pub async fn set_identity(&self, identity: &Identity) -> StoreResult<()> {
        let json = serde_json::to_string(identity)?;
        self.set(SESSION, &json).await
    }

    /// Returns the last successful sync time, epoch milliseconds.
    pub async fn last_sync(&self) -> StoreResult<Option<i64>> {
        let value = self
            .get(LAST_SYNC)
            .await?
            .and_then(|v| v.parse::<i64>().ok());

        Ok(value)
    }

    /// Records the last successful sync time.
    pub async fn set_last_sync(&self, epoch_ms: i64) -> StoreResult<()> {
        self.set(LAST_SYNC, &epoch_ms.to_string()).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use nabil_core::Identity;

    #[tokio::test]
    async fn test_earnings_defaults_to_zero() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        assert_eq!(store.scalars().earnings().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_earnings_round_trip() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let scalars = store.scalars();

        scalars.set_earnings(1250.5).await.unwrap();
        assert_eq!(scalars.earnings().await.unwrap(), 1250.5);
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let scalars = store.scalars();

        assert!(scalars.identity().await.unwrap().is_none());

        let identity = Identity {
            email: "nabil@example.com".into(),
            display_name: "Nabil".into(),
            avatar_url: String::new(),
        };
        scalars.set_identity(&identity).await.unwrap();

        let loaded = scalars.identity().await.unwrap().unwrap();
        assert_eq!(loaded, identity);
    }
}
