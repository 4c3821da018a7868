//! # Store Pool Management
//!
//! Connection pool creation and the [`Store`] handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Local Store Lifecycle                              │
//! │                                                                         │
//! │  App startup                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(path) ← Configure pool settings                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::new(config).await ← Create pool + run migrations                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.categories() / .products() / .sales() / .scalars()               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Sync engine only ever calls export_snapshot / import_snapshot:         │
//! │  it reads a full copy or writes a full replacement, never a             │
//! │  long-lived reference to live rows.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers do not block
//! writers and vice versa, with better crash recovery.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::scalar::{self, ScalarRepository};
use nabil_core::Snapshot;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/nabil.db")
///     .max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a local single-user app)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a new store configuration with the given path.
    ///
    /// The database file is created if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// In-memory SQLite requires a single connection - each connection
    /// would otherwise see its own private database.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main store handle providing repository access.
///
/// The store is the single owner of the underlying collections: only it
/// mutates local storage, and all callers go through its repositories.
#[derive(Debug, Clone)]
pub struct Store {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Store {
    /// Creates a new store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL journal, NORMAL synchronous)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing local store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!(max_connections = config.max_connections, "Store pool created");

        let store = Store { pool };

        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }

        Ok(store)
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer the repository accessors; this exists for advanced queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the category repository.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the sale ledger repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the scalar repository.
    pub fn scalars(&self) -> ScalarRepository {
        ScalarRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Snapshot Exchange
    // =========================================================================

    /// Builds a snapshot of the complete local state.
    ///
    /// This is a full copy: the snapshot holds no references to live rows.
    pub async fn export_snapshot(&self) -> StoreResult<Snapshot> {
        let categories = self.categories().list().await?;
        let products = self.products().list().await?;
        let sales = self.sales().list().await?;
        let earnings = self.scalars().earnings().await?;
        let last_sync = self.scalars().last_sync().await?;

        debug!(
            categories = categories.len(),
            products = products.len(),
            sales = sales.len(),
            "Exported snapshot"
        );

        Ok(Snapshot {
            categories,
            products,
            sales,
            earnings,
            last_sync,
        })
    }

    /// Overwrites the complete local state with a snapshot.
    ///
    /// Runs in a single transaction: either the whole snapshot applies or
    /// nothing does. The persisted identity (`session` scalar) is not part
    /// of a snapshot and is left untouched.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> StoreResult<()> {
        info!(records = snapshot.total_records(), "Importing snapshot");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sales").execute(&mut *tx).await?;

        for category in &snapshot.categories {
            sqlx::query("INSERT INTO categories (id, name, image) VALUES (?1, ?2, ?3)")
                .bind(&category.id)
                .bind(&category.name)
                .bind(&category.image)
                .execute(&mut *tx)
                .await?;
        }

        for product in &snapshot.products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, price, quantity, category_id, barcode, image)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.price)
            .bind(product.quantity)
            .bind(&product.category_id)
            .bind(&product.barcode)
            .bind(&product.image)
            .execute(&mut *tx)
            .await?;
        }

        for sale in &snapshot.sales {
            sqlx::query(
                r#"
                INSERT INTO sales (id, product_id, product_name, product_image, quantity, sold_at_price, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&sale.id)
            .bind(&sale.product_id)
            .bind(&sale.product_name)
            .bind(&sale.product_image)
            .bind(sale.quantity)
            .bind(sale.sold_at_price)
            .bind(sale.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        let upsert_scalar =
            "INSERT INTO scalars (name, value) VALUES (?1, ?2) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value";

        sqlx::query(upsert_scalar)
            .bind(scalar::EARNINGS)
            .bind(snapshot.earnings.to_string())
            .execute(&mut *tx)
            .await?;

        match snapshot.last_sync {
            Some(epoch_ms) => {
                sqlx::query(upsert_scalar)
                    .bind(scalar::LAST_SYNC)
                    .bind(epoch_ms.to_string())
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("DELETE FROM scalars WHERE name = ?1")
                    .bind(scalar::LAST_SYNC)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Wipes every collection and every scalar. Used only on sign-out.
    pub async fn clear_all(&self) -> StoreResult<()> {
        info!("Clearing all local data");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sales").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM scalars").execute(&mut *tx).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Checks if the store is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing store connection pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
