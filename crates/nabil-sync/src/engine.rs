//! # Sync Engine
//!
//! Orchestrates the snapshot exchange between the local store and the
//! remote object store. The engine owns no persistent state of its own -
//! it reads full copies from the store and writes full replacements back.
//!
//! ## Synchronization Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       synchronize() cycle                               │
//! │                                                                         │
//! │  1. pull()      fetch the remote snapshot (None if no backup exists)    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. overwrite   apply the remote snapshot to the local store, but       │
//! │     local       ONLY when it is newer than the last snapshot this       │
//! │                 device synchronized (lastSync comparison). This keeps   │
//! │                 back-to-back cycles on one device lossless while        │
//! │                 remaining last-writer-wins across devices.              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. push()      export the local state, stamp a fresh lastSync, and     │
//! │                 replace the remote object with it wholesale.            │
//! │                                                                         │
//! │  KNOWN LIMITATION: two devices syncing concurrently race their          │
//! │  pushes; the later writer wins with its ENTIRE snapshot and the         │
//! │  other device's interim edits are lost. This whole-snapshot             │
//! │  last-writer-wins model is deliberate (simplicity over correctness      │
//! │  under concurrent writers).                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! At most one cycle is in flight per engine: a second `synchronize()`
//! while one is running no-ops with [`SyncOutcome::AlreadyInProgress`].
//! Two racing pushes could otherwise leave the remote object in either
//! result non-deterministically. Sign-out raises the cancel flag; the
//! running cycle stops at its next checkpoint without applying anything
//! further.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::credential::CredentialSession;
use crate::error::{SyncError, SyncResult};
use crate::vault::RemoteVault;
use nabil_core::{next_timestamp, Snapshot};
use nabil_store::Store;

/// Result of a [`SyncEngine::synchronize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cycle ran to completion.
    Completed {
        /// Whether a remote snapshot was applied over the local state.
        applied_remote: bool,
    },

    /// Another cycle was already in flight; nothing was done.
    AlreadyInProgress,

    /// The cycle observed the cancel flag and stopped at a checkpoint.
    Cancelled,
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrator for snapshot synchronization.
///
/// Depends on [`Store`] (full-copy reads, full-replacement writes) and
/// [`CredentialSession`] (gates every remote call).
#[derive(Clone)]
pub struct SyncEngine {
    store: Store,
    session: Arc<CredentialSession>,
    vault: RemoteVault,
    object_name: String,
    in_flight: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl SyncEngine {
    /// Creates a sync engine.
    pub fn new(
        store: Store,
        session: Arc<CredentialSession>,
        config: &SyncConfig,
    ) -> SyncResult<Self> {
        config.validate()?;

        Ok(SyncEngine {
            store,
            session,
            vault: RemoteVault::new(config)?,
            object_name: config.object_name.clone(),
            in_flight: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    // =========================================================================
    // Primitive Operations
    // =========================================================================

    /// Pulls the remote snapshot.
    ///
    /// ## Returns
    /// * `Ok(Some(snapshot))` - backup exists and parsed
    /// * `Ok(None)` - no prior backup exists
    /// * `Err(CorruptSnapshot)` - backup exists but is unparseable; the
    ///   caller must not apply anything to the local store
    pub async fn pull(&self) -> SyncResult<Option<Snapshot>> {
        let token = self.credential().await?;

        let handle = self
            .after_vault(self.vault.find(&self.object_name, &token).await)
            .await?;

        let Some(handle) = handle else {
            debug!("No remote backup exists yet");
            return Ok(None);
        };

        let body = self
            .after_vault(self.vault.download(&handle.id, &token).await)
            .await?;

        let snapshot: Snapshot = serde_json::from_str(&body)
            .map_err(|e| SyncError::CorruptSnapshot(e.to_string()))?;

        info!(records = snapshot.total_records(), "Pulled remote snapshot");
        Ok(Some(snapshot))
    }

    /// Pushes a snapshot as the complete replacement of the remote object.
    ///
    /// Find-or-create by name: the lookup always runs first so overwriting
    /// never creates a duplicate object.
    pub async fn push(&self, snapshot: &Snapshot) -> SyncResult<()> {
        let token = self.credential().await?;

        let body = serde_json::to_string(snapshot)
            .map_err(|e| SyncError::Internal(format!("snapshot serialization failed: {e}")))?;

        let handle = self
            .after_vault(self.vault.find(&self.object_name, &token).await)
            .await?;

        match handle {
            Some(handle) => {
                self.after_vault(self.vault.overwrite(&handle.id, &body, &token).await)
                    .await?;
            }
            None => {
                self.after_vault(self.vault.create(&self.object_name, &body, &token).await)
                    .await?;
            }
        }

        info!(records = snapshot.total_records(), "Pushed snapshot");
        Ok(())
    }

    // =========================================================================
    // Synchronize
    // =========================================================================

    /// Runs one full synchronization cycle (see the module docs for the
    /// policy).
    ///
    /// Concurrent calls are a no-op while a cycle is in flight.
    pub async fn synchronize(&self) -> SyncResult<SyncOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Synchronize requested while another cycle is in flight");
            return Ok(SyncOutcome::AlreadyInProgress);
        }
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));
        self.cancelled.store(false, Ordering::SeqCst);

        info!("Starting synchronization");
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        let remote = self.pull().await?;

        if self.is_cancelled() {
            return self.cancelled_outcome();
        }

        let local_last_sync = self.store.scalars().last_sync().await?;
        let mut applied_remote = false;

        if let Some(snapshot) = remote {
            if remote_is_newer(snapshot.last_sync, local_last_sync) {
                self.store.import_snapshot(&snapshot).await?;
                applied_remote = true;
            } else {
                debug!("Remote snapshot is not newer, keeping local state");
            }
        }

        if self.is_cancelled() {
            return self.cancelled_outcome();
        }

        let mut snapshot = self.store.export_snapshot().await?;
        let stamp = next_timestamp();
        snapshot.last_sync = Some(stamp);

        self.push(&snapshot).await?;
        self.store.scalars().set_last_sync(stamp).await?;

        info!(applied_remote, "Synchronization complete");
        Ok(SyncOutcome::Completed { applied_remote })
    }

    // =========================================================================
    // Status & Cancellation
    // =========================================================================

    /// Whether a synchronization cycle is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Raises the cancel flag. The running cycle (if any) stops at its
    /// next checkpoint; used on sign-out so a dying session is not
    /// written to.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancelled_outcome(&self) -> SyncResult<SyncOutcome> {
        warn!("Synchronization cancelled");
        Ok(SyncOutcome::Cancelled)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Fetches the current access credential or fails without touching the
    /// network.
    async fn credential(&self) -> SyncResult<String> {
        self.session
            .access_credential()
            .await
            .ok_or(SyncError::NotSignedIn)
    }

    /// Post-processes a vault result: an authorization failure invalidates
    /// the cached credential so the UI can prompt for re-consent.
    async fn after_vault<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(SyncError::AuthorizationExpired) = &result {
            warn!("Remote store rejected the credential, invalidating session");
            self.session.invalidate().await;
        }
        result
    }
}

/// Whether the pulled remote snapshot should overwrite the local state.
///
/// The comparison key is `lastSync`: a remote snapshot this device (or
/// another) pushed after our last completed cycle is newer and wins. A
/// device that never synchronized always accepts an existing backup.
fn remote_is_newer(remote_last_sync: Option<i64>, local_last_sync: Option<i64>) -> bool {
    match (remote_last_sync, local_last_sync) {
        (Some(remote), Some(local)) => remote > local,
        (_, None) => true,
        (None, Some(_)) => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
