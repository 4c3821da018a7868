//! # nabil-store: Local Store for Nabil POS
//!
//! Durable, keyed, per-collection storage on the device. SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Nabil POS Data Flow                              │
//! │                                                                         │
//! │  Facade operation (upsert_product, record_sale, ...)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     nabil-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │     Store     │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │ (per entity)  │    │  (embedded)  │   │   │
//! │  │   │               │    │               │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ CategoryRepo  │    │ 001_init.sql │   │   │
//! │  │   │ Snapshot      │    │ ProductRepo   │    │              │   │   │
//! │  │   │ export/import │    │ SaleRepo      │    │              │   │   │
//! │  │   │ clear_all     │    │ ScalarRepo    │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nabil_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/nabil.db")).await?;
//! let products = store.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::scalar::ScalarRepository;
