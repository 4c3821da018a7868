//! Test doubles for the sync crate: a scripted HTTP responder, an
//! in-memory remote vault server, and a stub consent flow.
//!
//! The servers speak just enough HTTP/1.1 for reqwest: one request per
//! connection, `Connection: close` on every response.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::credential::{ConsentFlow, ConsentOutcome, CredentialSession};
use crate::error::SyncResult;
use nabil_core::Identity;

// =============================================================================
// Stub Consent Flow
// =============================================================================

pub(crate) struct StubConsent {
    outcome: ConsentOutcome,
}

impl StubConsent {
    pub fn granted(identity: Identity, authorization_code: &str) -> Self {
        StubConsent {
            outcome: ConsentOutcome::Granted {
                identity,
                authorization_code: authorization_code.to_string(),
            },
        }
    }

    pub fn denied() -> Self {
        StubConsent {
            outcome: ConsentOutcome::Denied,
        }
    }

    pub fn cancelled() -> Self {
        StubConsent {
            outcome: ConsentOutcome::Cancelled,
        }
    }
}

#[async_trait]
impl ConsentFlow for StubConsent {
    async fn request_consent(&self) -> SyncResult<ConsentOutcome> {
        Ok(self.outcome.clone())
    }
}

// =============================================================================
// Minimal HTTP plumbing
// =============================================================================

pub(crate) struct ParsedRequest {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

async fn read_request(stream: &mut TcpStream) -> Option<ParsedRequest> {
    let mut buffer = Vec::new();
    let header_end = loop {
        let mut chunk = [0_u8; 2048];
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let mut chunk = [0_u8; 2048];
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Some(ParsedRequest {
        method,
        target,
        headers,
        body,
    })
}

async fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

// =============================================================================
// Scripted responder
// =============================================================================

/// Serves the given (status, body) responses in order, one per request,
/// regardless of the request contents. Returns the server's base URL.
pub(crate) async fn spawn_script(
    responses: Vec<(u16, String)>,
) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            if read_request(&mut stream).await.is_some() {
                let _ = write_response(&mut stream, status, &body).await;
            }
        }
    });

    (format!("http://{}", addr), handle)
}

// =============================================================================
// In-memory vault server
// =============================================================================

#[derive(Debug, Clone)]
struct StoredObject {
    id: String,
    name: String,
    body: String,
}

#[derive(Debug, Default)]
struct VaultState {
    object: Option<StoredObject>,
    /// When set, requests must carry `Authorization: Bearer <token>`.
    expected_token: Option<String>,
    /// When set, every request is answered with this status.
    fail_status: Option<u16>,
    /// Delay applied before answering, for in-flight guard tests.
    delay_ms: u64,
}

/// A stateful stand-in for the remote object store: holds at most one
/// named object and implements find-by-name, download, multipart create
/// and media overwrite.
pub(crate) struct MockVault {
    base_url: String,
    state: Arc<Mutex<VaultState>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockVault {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let state = Arc::new(Mutex::new(VaultState::default()));
        let server_state = Arc::clone(&state);
        let next_id = Arc::new(AtomicU64::new(1));

        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&server_state);
                let next_id = Arc::clone(&next_id);
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let (status, body) = handle_request(&state, &next_id, request).await;
                    let _ = write_response(&mut stream, status, &body).await;
                });
            }
        });

        MockVault {
            base_url: format!("http://{}", addr),
            state,
            _handle: handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requires every request to carry this bearer token.
    pub async fn require_token(&self, token: &str) {
        self.state.lock().await.expected_token = Some(token.to_string());
    }

    /// Makes every request fail with the given status.
    pub async fn fail_with(&self, status: u16) {
        self.state.lock().await.fail_status = Some(status);
    }

    /// Delays every response.
    pub async fn set_delay_ms(&self, delay_ms: u64) {
        self.state.lock().await.delay_ms = delay_ms;
    }

    /// Seeds the stored object directly.
    pub async fn seed_object(&self, name: &str, body: &str) {
        self.state.lock().await.object = Some(StoredObject {
            id: "seeded-1".to_string(),
            name: name.to_string(),
            body: body.to_string(),
        });
    }

    /// Returns the stored object body, if any.
    pub async fn object_body(&self) -> Option<String> {
        self.state.lock().await.object.as_ref().map(|o| o.body.clone())
    }

    /// Returns the stored object id, if any.
    pub async fn object_id(&self) -> Option<String> {
        self.state.lock().await.object.as_ref().map(|o| o.id.clone())
    }
}

async fn handle_request(
    state: &Arc<Mutex<VaultState>>,
    next_id: &Arc<AtomicU64>,
    request: ParsedRequest,
) -> (u16, String) {
    let delay_ms = state.lock().await.delay_ms;
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let mut state = state.lock().await;

    if let Some(status) = state.fail_status {
        return (status, r#"{"error":"scripted failure"}"#.to_string());
    }

    if let Some(expected) = &state.expected_token {
        let authorized = request
            .headers
            .get("authorization")
            .map(|v| v == &format!("Bearer {expected}"))
            .unwrap_or(false);
        if !authorized {
            return (
                401,
                r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#.to_string(),
            );
        }
    }

    let path = request.target.split('?').next().unwrap_or("");

    match (request.method.as_str(), path) {
        // Find-by-name: the simulation holds at most one object, so the
        // query string is not inspected.
        ("GET", "/files") => {
            let files = match &state.object {
                Some(object) => format!(
                    r#"{{"files":[{{"id":"{}","name":"{}"}}]}}"#,
                    object.id, object.name
                ),
                None => r#"{"files":[]}"#.to_string(),
            };
            (200, files)
        }

        // Download
        ("GET", p) if p.starts_with("/files/") => match &state.object {
            Some(object) if p == format!("/files/{}", object.id) => (200, object.body.clone()),
            _ => (404, r#"{"error":"not found"}"#.to_string()),
        },

        // Multipart create
        ("POST", "/files") => {
            let content_type = request
                .headers
                .get("content-type")
                .cloned()
                .unwrap_or_default();
            let Some(boundary) = content_type
                .split("boundary=")
                .nth(1)
                .map(|b| b.trim().to_string())
            else {
                return (400, r#"{"error":"missing multipart boundary"}"#.to_string());
            };

            let raw = String::from_utf8_lossy(&request.body).to_string();
            let parts: Vec<&str> = raw.split(&format!("--{boundary}")).collect();
            // parts: ["", metadata, media, "--\r\n"]
            if parts.len() < 4 {
                return (400, r#"{"error":"malformed multipart body"}"#.to_string());
            }

            let metadata_json = part_payload(parts[1]);
            let media = part_payload(parts[2]);

            let name = serde_json::from_str::<serde_json::Value>(&metadata_json)
                .ok()
                .and_then(|v| v["name"].as_str().map(str::to_string))
                .unwrap_or_default();
            if name.is_empty() {
                return (400, r#"{"error":"metadata part has no name"}"#.to_string());
            }

            let id = format!("obj-{}", next_id.fetch_add(1, Ordering::SeqCst));
            state.object = Some(StoredObject {
                id: id.clone(),
                name: name.clone(),
                body: media,
            });

            (200, format!(r#"{{"id":"{id}","name":"{name}"}}"#))
        }

        // Media overwrite
        ("PATCH", p) if p.starts_with("/files/") => {
            let Some(object) = state.object.as_mut() else {
                return (404, r#"{"error":"not found"}"#.to_string());
            };
            if p != format!("/files/{}", object.id) {
                return (404, r#"{"error":"not found"}"#.to_string());
            }
            object.body = String::from_utf8_lossy(&request.body).to_string();
            (
                200,
                format!(r#"{{"id":"{}","name":"{}"}}"#, object.id, object.name),
            )
        }

        _ => (404, r#"{"error":"no such route"}"#.to_string()),
    }
}

/// Extracts the payload of a multipart part: everything after the blank
/// line separating part headers from content, minus the trailing CRLF.
fn part_payload(part: &str) -> String {
    part.split_once("\r\n\r\n")
        .map(|(_, payload)| payload.trim_end_matches("\r\n").to_string())
        .unwrap_or_default()
}

// =============================================================================
// Session helper
// =============================================================================

pub(crate) fn test_identity() -> Identity {
    Identity {
        email: "nabil@example.com".into(),
        display_name: "Nabil".into(),
        avatar_url: String::new(),
    }
}

/// Builds a session already holding the given bearer token, by running the
/// real sign-in against a one-shot token endpoint.
pub(crate) async fn authorized_session(token: &str) -> Arc<CredentialSession> {
    let (base_url, _handle) = spawn_script(vec![(
        200,
        format!(r#"{{"access_token":"{token}","expires_in":3600}}"#),
    )])
    .await;

    let session = Arc::new(
        CredentialSession::new(format!("{base_url}/token"), Duration::from_secs(5)).unwrap(),
    );
    session
        .sign_in(&StubConsent::granted(test_identity(), "code"))
        .await
        .unwrap();

    session
}
