//! # File Backup
//!
//! Manual export/import of the complete state as a JSON file, for users
//! moving data by hand instead of through the cloud account.
//!
//! Import is stricter than snapshot parsing: a file missing the
//! `categories` or `products` collections is rejected as not being a
//! backup of this application, instead of silently importing emptiness
//! over real data.

use tracing::info;

use crate::error::{AppError, AppResult, ErrorCode};
use nabil_core::Snapshot;
use nabil_store::Store;

/// Serializes the complete local state as pretty-printed JSON.
pub async fn export_backup(store: &Store) -> AppResult<String> {
    let snapshot = store.export_snapshot().await?;

    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| AppError::new(ErrorCode::Internal, e.to_string()))?;

    info!(records = snapshot.total_records(), "Exported backup");
    Ok(json)
}

/// Parses a backup file and overwrites the complete local state with it.
///
/// Returns the imported snapshot.
pub async fn import_backup(store: &Store, json: &str) -> AppResult<Snapshot> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| AppError::new(ErrorCode::CorruptBackup, format!("unreadable file: {e}")))?;

    let has_collections = value.get("categories").is_some_and(|v| v.is_array())
        && value.get("products").is_some_and(|v| v.is_array());
    if !has_collections {
        return Err(AppError::new(
            ErrorCode::CorruptBackup,
            "not a Nabil backup file (missing categories/products)",
        ));
    }

    let snapshot: Snapshot = serde_json::from_value(value)
        .map_err(|e| AppError::new(ErrorCode::CorruptBackup, e.to_string()))?;

    store.import_snapshot(&snapshot).await?;

    info!(records = snapshot.total_records(), "Imported backup");
    Ok(snapshot)
}

// =============================================================================
// Unit Tests
// =============================================================================
