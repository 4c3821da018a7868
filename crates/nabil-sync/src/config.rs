//! # Sync Configuration
//!
//! Configuration for the remote object store and token endpoints.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     NABIL_API_URL, NABIL_UPLOAD_URL, NABIL_TOKEN_URL                    │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/nabil-pos/sync.toml (Linux)                               │
//! │     ~/Library/Application Support/com.nabil.pos/sync.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     Provider endpoints + the well-known object name                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! api_base_url = "https://www.googleapis.com/drive/v3"
//! upload_base_url = "https://www.googleapis.com/upload/drive/v3"
//! token_url = "https://oauth2.googleapis.com/token"
//! object_name = "nabil_cloud_data.json"
//! request_timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

/// The well-known remote object name.
///
/// The application owns exactly one remote object per authenticated
/// identity; this is its fixed name. Changing it orphans existing backups.
pub const DEFAULT_OBJECT_NAME: &str = "nabil_cloud_data.json";

/// Default timeout for remote requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_object_name() -> String {
    DEFAULT_OBJECT_NAME.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Sync engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL for metadata requests (find-by-name, download).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for content uploads (multipart create, media overwrite).
    /// The provider separates upload traffic from metadata traffic.
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    /// Token endpoint for exchanging an authorization code for an access
    /// token.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// The fixed remote object name.
    #[serde(default = "default_object_name")]
    pub object_name: String,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            token_url: default_token_url(),
            object_name: default_object_name(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SyncConfig {
    /// Loads the configuration, falling back to defaults.
    ///
    /// ## Flow
    /// 1. Read the TOML file at `path` (or the platform config dir)
    /// 2. Missing file → defaults (not an error)
    /// 3. Apply environment variable overrides
    pub fn load_or_default(path: Option<PathBuf>) -> Self {
        let path = path.or_else(Self::config_file_path);

        let mut config = match path {
            Some(ref p) if p.exists() => match Self::load_file(p) {
                Ok(config) => {
                    debug!(path = %p.display(), "Loaded sync config");
                    config
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "Failed to load sync config, using defaults");
                    SyncConfig::default()
                }
            },
            _ => SyncConfig::default(),
        };

        config.apply_env_overrides();
        config
    }

    /// Saves the configuration to `path` (or the platform config dir).
    pub fn save(&self, path: Option<PathBuf>) -> SyncResult<()> {
        let path = path
            .or_else(Self::config_file_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("no config directory".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(&path, toml).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(path = %path.display(), "Saved sync config");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("upload_base_url", &self.upload_base_url),
            ("token_url", &self.token_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(SyncError::InvalidConfig(format!(
                    "{field} must be an http(s) URL, got '{value}'"
                )));
            }
        }

        if self.object_name.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "object_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The platform config file path: `<config dir>/sync.toml`.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "nabil", "nabil-pos")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    fn load_file(path: &PathBuf) -> SyncResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("NABIL_API_URL") {
            self.api_base_url = url;
        }
        if let Ok(url) = std::env::var("NABIL_UPLOAD_URL") {
            self.upload_base_url = url;
        }
        if let Ok(url) = std::env::var("NABIL_TOKEN_URL") {
            self.token_url = url;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
