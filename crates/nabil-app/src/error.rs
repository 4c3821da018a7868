//! # App Error Type
//!
//! Unified error type for the collaborator-facing operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Nabil POS                              │
//! │                                                                         │
//! │  Facade operation                                                       │
//! │  Result<T, AppError>                                                    │
//! │         │                                                               │
//! │         ├── Store failure?  ── StoreError ──┐                           │
//! │         ├── Sync failure?   ── SyncError  ──┤── AppError ──► UI         │
//! │         ├── Rule violation? ── CoreError  ──┘   {code, message}         │
//! │         │                                                               │
//! │         └── Success ──────────────────────────► value                   │
//! │                                                                         │
//! │  The code is machine-readable so collaborators can branch (retry        │
//! │  prompt for Sync, re-consent prompt for Auth, form feedback for         │
//! │  Validation); the message is display-ready.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use nabil_core::{CoreError, ValidationError};
use nabil_store::StoreError;
use nabil_sync::SyncError;

/// Error returned from facade operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for facade responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Business rule violation (e.g., insufficient stock)
    BusinessLogic,

    /// Local persistence failed - fatal for the current operation,
    /// reported to the user, not retried automatically
    StorageError,

    /// Credential invalid or expired - recoverable by re-consent
    AuthorizationExpired,

    /// Network or remote-service failure - recoverable by manual retry;
    /// local data remains intact and usable offline
    SyncError,

    /// Remote backup unparseable - local data preserved as the safer copy
    CorruptBackup,

    /// Internal error
    Internal,
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        AppError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::AuthorizationExpired
            | SyncError::NotSignedIn
            | SyncError::ConsentDenied
            | SyncError::ConsentCancelled
            | SyncError::ExchangeFailed(_) => ErrorCode::AuthorizationExpired,
            SyncError::CorruptSnapshot(_) => ErrorCode::CorruptBackup,
            SyncError::Storage(_) => ErrorCode::StorageError,
            SyncError::Transient(_) | SyncError::Remote { .. } => ErrorCode::SyncError,
            _ => ErrorCode::Internal,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => AppError::not_found("Product", &id),
            CoreError::InsufficientStock { .. } => {
                AppError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for facade operations.
pub type AppResult<T> = Result<T, AppError>;
