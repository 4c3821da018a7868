//! # Account Operations
//!
//! Sign-in, sign-out, and synchronization for the cloud account.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sign_in(flow)                                                          │
//! │    1. CredentialSession runs the consent flow and the token exchange    │
//! │    2. The identity record is persisted (the `session` scalar)           │
//! │    3. An initial synchronize() adopts an existing cloud backup.         │
//! │       This pull is an explicit call here, not a hidden side effect      │
//! │       of credential acquisition - and its failure does NOT undo the     │
//! │       sign-in: local data stays usable offline.                         │
//! │                                                                         │
//! │  sign_out()                                                             │
//! │    1. Cancel any in-flight sync (its result is discarded)               │
//! │    2. Invalidate the cached credential and identity                     │
//! │    3. Wipe every local collection and scalar                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppResult;
use nabil_core::Identity;
use nabil_store::Store;
use nabil_sync::{ConsentFlow, CredentialSession, SyncEngine, SyncOutcome};

/// Account lifecycle and synchronization facade.
#[derive(Clone)]
pub struct AccountService {
    store: Store,
    session: Arc<CredentialSession>,
    engine: SyncEngine,
}

impl AccountService {
    /// Creates the service.
    pub fn new(store: Store, session: Arc<CredentialSession>, engine: SyncEngine) -> Self {
        AccountService {
            store,
            session,
            engine,
        }
    }

    /// Runs the interactive sign-in, persists the identity, and performs
    /// the initial synchronization.
    pub async fn sign_in(&self, flow: &dyn ConsentFlow) -> AppResult<Identity> {
        let identity = self.session.sign_in(flow).await?;
        self.store.scalars().set_identity(&identity).await?;

        // Adopt an existing cloud backup right away. Sync failures are
        // non-fatal here: the account is signed in either way.
        match self.engine.synchronize().await {
            Ok(outcome) => info!(?outcome, "Initial synchronization finished"),
            Err(e) => warn!(error = %e, "Initial synchronization failed, continuing offline"),
        }

        Ok(identity)
    }

    /// Signs out: cancels sync, drops the credential, wipes local data.
    pub async fn sign_out(&self) -> AppResult<()> {
        info!("Signing out");

        self.engine.cancel();
        self.session.invalidate().await;
        self.store.clear_all().await?;

        Ok(())
    }

    /// Returns the persisted identity record, if signed in.
    pub async fn current_session(&self) -> AppResult<Option<Identity>> {
        Ok(self.store.scalars().identity().await?)
    }

    /// Runs one synchronization cycle.
    pub async fn synchronize(&self) -> AppResult<SyncOutcome> {
        Ok(self.engine.synchronize().await?)
    }

    /// Whether a synchronization cycle is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.engine.is_syncing()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
