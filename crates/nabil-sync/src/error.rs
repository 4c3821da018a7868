//! # Sync Error Types
//!
//! Error types for credential and sync operations.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌─────────────────┐  ┌─────────────────────┐ │
//! │  │    Authorization    │  │    Transport    │  │      Snapshot       │ │
//! │  │                     │  │                 │  │                     │ │
//! │  │ AuthorizationExpired│  │  Transient      │  │  CorruptSnapshot    │ │
//! │  │ NotSignedIn         │  │  Remote         │  │                     │ │
//! │  │ ConsentDenied       │  │                 │  │  never applied to   │ │
//! │  │ ConsentCancelled    │  │  no auto-retry  │  │  the local store    │ │
//! │  │ ExchangeFailed      │  │  inside sync    │  │                     │ │
//! │  └─────────────────────┘  └─────────────────┘  └─────────────────────┘ │
//! │                                                                         │
//! │  Storage failures pass through unchanged; sync failures are always     │
//! │  non-fatal to local CRUD - the app stays fully usable offline.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering credential and cloud failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Authorization Errors
    // =========================================================================
    /// The remote store rejected the credential (401/403).
    ///
    /// The cached credential has been invalidated; the UI should prompt
    /// for re-consent ("please sign in again").
    #[error("Authorization expired - sign in again")]
    AuthorizationExpired,

    /// No credential is cached (never acquired, or cleared).
    #[error("Not signed in")]
    NotSignedIn,

    /// The user denied the consent request.
    #[error("Consent was denied")]
    ConsentDenied,

    /// The user dismissed the consent request without answering.
    #[error("Consent was cancelled")]
    ConsentCancelled,

    /// The authorization code could not be exchanged for an access token.
    #[error("Credential exchange failed: {0}")]
    ExchangeFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Network or remote-service failure (timeout, DNS, 5xx).
    ///
    /// Recoverable by manual retry; the caller must not assume a push
    /// succeeded.
    #[error("Sync failed: {0}")]
    Transient(String),

    /// The remote store answered with a non-retryable error status.
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    /// The remote blob could not be parsed as a snapshot.
    ///
    /// The local state is preserved as the safer copy - a corrupt snapshot
    /// is never applied.
    #[error("Remote snapshot is corrupt: {0}")]
    CorruptSnapshot(String),

    // =========================================================================
    // Pass-through and Internal
    // =========================================================================
    /// Local persistence failure.
    #[error(transparent)]
    Storage(#[from] nabil_store::StoreError),

    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Internal sync error.
    #[error("Internal sync error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transient(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if the failed operation can be retried as-is.
    ///
    /// ## Retryable
    /// - Network failures and 5xx responses
    ///
    /// ## Non-Retryable
    /// - Authorization failures (need re-consent first)
    /// - Corrupt snapshots (retrying downloads the same bytes)
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transient(_))
    }

    /// Returns true if this error means the user must sign in (again).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            SyncError::AuthorizationExpired | SyncError::NotSignedIn
        )
    }
}
