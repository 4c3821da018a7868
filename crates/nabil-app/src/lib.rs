//! # nabil-app: Orchestration Facade for Nabil POS
//!
//! The thin layer UI collaborators call into. Wires the local store, the
//! credential session, and the sync engine together and exposes the typed
//! operations of the core.
//!
//! ## Module Organization
//! ```text
//! nabil_app/
//! ├── lib.rs          ◄─── You are here (NabilPos wiring)
//! ├── inventory.rs    ◄─── Catalog CRUD, cascade delete, record_sale
//! ├── account.rs      ◄─── Sign-in/out, current session, synchronize
//! ├── backup.rs       ◄─── Manual JSON export/import
//! ├── telemetry.rs    ◄─── Tracing subscriber setup
//! └── error.rs        ◄─── AppError {code, message}
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            tracing-subscriber with env filter        │
//! │  2. SyncConfig::load_or_default(None)                                   │
//! │  3. NabilPos::open(StoreConfig::new(db_path), sync_config)              │
//! │       • opens the SQLite store, runs migrations                         │
//! │       • builds the credential session and the sync engine               │
//! │  4. app.inventory() / app.account() from the UI layer                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod account;
pub mod backup;
pub mod error;
pub mod inventory;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use account::AccountService;
pub use error::{AppError, AppResult, ErrorCode};
pub use inventory::InventoryService;
pub use telemetry::init_tracing;

pub use nabil_core::{Category, Identity, Product, SaleRecord, Snapshot};
pub use nabil_store::{Store, StoreConfig};
pub use nabil_sync::{ConsentFlow, ConsentOutcome, SyncConfig, SyncOutcome};

use std::sync::Arc;

use nabil_sync::{CredentialSession, SyncEngine};

/// The assembled application core.
pub struct NabilPos {
    store: Store,
    inventory: InventoryService,
    account: AccountService,
}

impl NabilPos {
    /// Opens the store and wires the services together.
    pub async fn open(store_config: StoreConfig, sync_config: SyncConfig) -> AppResult<Self> {
        let store = Store::new(store_config).await?;

        let session = Arc::new(CredentialSession::from_config(&sync_config)?);
        let engine = SyncEngine::new(store.clone(), Arc::clone(&session), &sync_config)?;

        Ok(NabilPos {
            inventory: InventoryService::new(store.clone()),
            account: AccountService::new(store.clone(), session, engine),
            store,
        })
    }

    /// Catalog and sale operations.
    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }

    /// Account lifecycle and synchronization.
    pub fn account(&self) -> &AccountService {
        &self.account
    }

    /// Direct store access, for hosts that need it.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Serializes the complete local state as a JSON backup file.
    pub async fn export_backup(&self) -> AppResult<String> {
        backup::export_backup(&self.store).await
    }

    /// Overwrites the complete local state from a JSON backup file.
    pub async fn import_backup(&self, json: &str) -> AppResult<Snapshot> {
        backup::import_backup(&self.store, json).await
    }
}
