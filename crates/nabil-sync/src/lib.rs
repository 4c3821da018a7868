//! # nabil-sync: Credential Session + Sync Engine for Nabil POS
//!
//! This crate manages the access-credential lifecycle and the snapshot
//! exchange with the remote object store, enabling offline-first operation
//! with on-demand cloud backup.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Architecture                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   SyncEngine (engine.rs)                         │  │
//! │  │                                                                  │  │
//! │  │  pull / push / synchronize with an in-flight guard and a         │  │
//! │  │  cancel flag. Owns no persistent state: reads full copies        │  │
//! │  │  from the store, writes full replacements back.                  │  │
//! │  └───────────┬─────────────────────────────────┬────────────────────┘  │
//! │              │                                 │                       │
//! │              ▼                                 ▼                       │
//! │  ┌────────────────────────┐      ┌──────────────────────────────────┐  │
//! │  │ CredentialSession      │      │ RemoteVault (vault.rs)           │  │
//! │  │ (credential.rs)        │      │                                  │  │
//! │  │                        │      │ find-by-name / download /        │  │
//! │  │ Consent flow (async,   │      │ multipart create / media         │  │
//! │  │ explicit deny/cancel)  │      │ overwrite against the            │  │
//! │  │ Token cache + expiry   │      │ provider's app-private area      │  │
//! │  │ invalidate() on 401    │      │                                  │  │
//! │  └────────────────────────┘      └──────────────────────────────────┘  │
//! │                                                                         │
//! │  DEPENDENCIES:                                                          │
//! │  • nabil-core: Snapshot, Identity                                       │
//! │  • nabil-store: export_snapshot / import_snapshot                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nabil_sync::{CredentialSession, SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::load_or_default(None);
//! let session = Arc::new(CredentialSession::from_config(&config)?);
//! let engine = SyncEngine::new(store, session.clone(), &config)?;
//!
//! session.sign_in(&consent_flow).await?;
//! engine.synchronize().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod vault;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{SyncConfig, DEFAULT_OBJECT_NAME};
pub use credential::{ConsentFlow, ConsentOutcome, CredentialSession, SessionPhase, TokenInfo};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{SyncError, SyncResult};
pub use vault::{ObjectHandle, RemoteVault};
