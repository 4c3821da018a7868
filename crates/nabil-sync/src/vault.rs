//! # Remote Vault Client
//!
//! HTTP client for the remote object store. The application owns exactly
//! one object per authenticated identity, looked up by its well-known
//! name in the provider's application-private area.
//!
//! ## Request Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Vault Operations                            │
//! │                                                                         │
//! │  find(name)       GET  {api}/files?q=name='{name}'&spaces=appDataFolder│
//! │                   → {"files":[{"id","name"}]}                           │
//! │                                                                         │
//! │  download(id)     GET  {api}/files/{id}?alt=media                       │
//! │                   → raw JSON body                                       │
//! │                                                                         │
//! │  create(name, b)  POST {upload}/files?uploadType=multipart              │
//! │                   multipart/related: metadata part + media part         │
//! │                   in ONE round trip                                     │
//! │                                                                         │
//! │  overwrite(id, b) PATCH {upload}/files/{id}?uploadType=media            │
//! │                   in-place update, same object identity                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `find` must always run before `create`: the find-or-create-by-name
//! lookup is what prevents duplicate remote objects.

use serde::Deserialize;
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Handle to the remote object.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectHandle {
    pub id: String,
    pub name: String,
}

/// Wire shape of the find-by-name response.
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<ObjectHandle>,
}

/// Client for the remote object store.
#[derive(Debug, Clone)]
pub struct RemoteVault {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
}

impl RemoteVault {
    /// Creates a vault client from the sync configuration.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(RemoteVault {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base: config.upload_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Looks up the remote object by its well-known name.
    ///
    /// ## Returns
    /// * `Ok(Some(handle))` - object exists
    /// * `Ok(None)` - no prior backup exists (not an error)
    pub async fn find(&self, name: &str, token: &str) -> SyncResult<Option<ObjectHandle>> {
        let url = format!("{}/files", self.api_base);
        debug!(name = %name, "Looking up remote object");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", format!("name = '{name}'")),
                ("spaces", "appDataFolder".to_string()),
                ("fields", "files(id, name)".to_string()),
            ])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let list: FileList = response
            .json()
            .await
            .map_err(|e| SyncError::Transient(format!("unreadable file list: {e}")))?;

        let handle = list.files.into_iter().find(|f| f.name == name);
        debug!(found = handle.is_some(), "Remote object lookup complete");

        Ok(handle)
    }

    /// Downloads the full content of the remote object.
    pub async fn download(&self, id: &str, token: &str) -> SyncResult<String> {
        let url = format!("{}/files/{}", self.api_base, id);
        debug!(id = %id, "Downloading remote object");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let body = response.text().await?;
        debug!(bytes = body.len(), "Downloaded remote object");

        Ok(body)
    }

    /// Creates the remote object: metadata and JSON body in one
    /// multipart/related request (a single round trip, not
    /// create-then-write).
    pub async fn create(&self, name: &str, body: &str, token: &str) -> SyncResult<ObjectHandle> {
        let url = format!("{}/files", self.upload_base);
        debug!(name = %name, bytes = body.len(), "Creating remote object");

        let metadata = serde_json::json!({
            "name": name,
            "parents": ["appDataFolder"],
            "mimeType": "application/json",
        });

        let boundary = format!("nabil-{}", uuid::Uuid::new_v4().simple());
        let payload = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: application/json\r\n\r\n\
             {body}\r\n\
             --{boundary}--\r\n"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "multipart")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(payload)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let handle: ObjectHandle = response
            .json()
            .await
            .map_err(|e| SyncError::Transient(format!("unreadable create response: {e}")))?;

        debug!(id = %handle.id, "Created remote object");
        Ok(handle)
    }

    /// Overwrites the content of the remote object in place.
    ///
    /// The object identity is preserved - afterwards the object contains
    /// exactly `body`, nothing merged in from its prior content.
    pub async fn overwrite(&self, id: &str, body: &str, token: &str) -> SyncResult<()> {
        let url = format!("{}/files/{}", self.upload_base, id);
        debug!(id = %id, bytes = body.len(), "Overwriting remote object");

        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;
        Self::ensure_success(response).await?;

        Ok(())
    }

    /// Maps error statuses onto the sync error taxonomy.
    ///
    /// ## Mapping
    /// ```text
    /// 401, 403        → AuthorizationExpired (credential must be cleared)
    /// 408, 429, 5xx   → Transient            (caller may retry manually)
    /// other non-2xx   → Remote               (not retryable as-is)
    /// ```
    async fn ensure_success(response: reqwest::Response) -> SyncResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        debug!(status = code, body = %preview, "Remote store error response");

        match code {
            401 | 403 => Err(SyncError::AuthorizationExpired),
            408 | 429 | 500..=599 => Err(SyncError::Transient(format!("HTTP {code}: {preview}"))),
            _ => Err(SyncError::Remote {
                status: code,
                message: preview,
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
