//! # Credential Session
//!
//! Lifecycle management for the bearer credential required to reach the
//! remote object store.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SignedOut ──sign_in()──► Authenticating ──both exchanges ok──►        │
//! │       ▲                          │                      Authorized      │
//! │       │                          │ denied/cancelled/       │            │
//! │       │                          │ exchange failed         │ token ages │
//! │       │                          ▼                         ▼            │
//! │       └──────invalidate()─── SignedOut                  Expired         │
//! │                                  ▲                         │            │
//! │                                  └───────invalidate()──────┘            │
//! │                                                                         │
//! │  Two distinct exchanges happen inside sign_in():                        │
//! │   1. the interactive consent flow asserts the user's identity and       │
//! │      yields an authorization code;                                      │
//! │   2. the code is exchanged at the token endpoint for a scoped           │
//! │      access token.                                                      │
//! │  Both must succeed before any sync call is attempted.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Storage
//! The token is cached in memory only. It is never written to the local
//! store - sign-out and authorization-denied responses clear it via
//! [`CredentialSession::invalidate`].

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use nabil_core::Identity;

/// Margin before token expiration at which the credential stops being
/// handed out. A call started with a nearly-dead token would fail mid-way.
const EXPIRY_MARGIN_SECS: u64 = 60;

const MAX_ERROR_BODY_CHARS: usize = 512;

// =============================================================================
// Consent Flow
// =============================================================================

/// Outcome of the interactive consent flow.
///
/// Denial and cancellation are explicit variants: the UI awaits this
/// result instead of registering a callback that may silently never fire.
#[derive(Debug, Clone)]
pub enum ConsentOutcome {
    /// The user granted access: identity assertion plus an authorization
    /// code to exchange for the scoped access token.
    Granted {
        identity: Identity,
        authorization_code: String,
    },

    /// The user explicitly refused.
    Denied,

    /// The user dismissed the prompt without answering.
    Cancelled,
}

/// The interactive consent step, implemented by the UI collaborator.
///
/// Injected into [`CredentialSession::sign_in`] so the core never reaches
/// into ambient global state to find it.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn request_consent(&self) -> SyncResult<ConsentOutcome>;
}

// =============================================================================
// Token Info
// =============================================================================

/// Cached access token plus its expiry.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// The opaque bearer token.
    pub access_token: String,
    /// When the token expires (local monotonic time).
    pub expires_at: Instant,
}

impl TokenInfo {
    /// Creates a token that expires after `expires_in`.
    pub fn new(access_token: String, expires_in: Duration) -> Self {
        TokenInfo {
            access_token,
            expires_at: Instant::now() + expires_in,
        }
    }

    /// Check if the token is completely expired (no margin).
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Check if the token is still worth handing out (expiry margin
    /// applied).
    pub fn is_usable(&self) -> bool {
        Instant::now() + Duration::from_secs(EXPIRY_MARGIN_SECS) < self.expires_at
    }

    /// Get remaining valid time in seconds.
    pub fn remaining_secs(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

// =============================================================================
// Session Phase
// =============================================================================

/// Observable phase of the credential session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    SignedOut,
    Authenticating,
    Authorized,
    Expired,
}

// =============================================================================
// Credential Session
// =============================================================================

#[derive(Debug, Default)]
struct SessionInner {
    identity: Option<Identity>,
    token: Option<TokenInfo>,
    authenticating: bool,
}

/// Wire shape of the token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Manages the identity assertion and the cached access credential.
///
/// The session exclusively owns the cached credential; the sync engine
/// asks it for the current token before every remote call and reports
/// authorization failures back through [`CredentialSession::invalidate`].
pub struct CredentialSession {
    http: reqwest::Client,
    token_url: String,
    inner: Arc<RwLock<SessionInner>>,
}

impl CredentialSession {
    /// Creates a new session against the given token endpoint.
    pub fn new(token_url: impl Into<String>, request_timeout: Duration) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(CredentialSession {
            http,
            token_url: token_url.into(),
            inner: Arc::new(RwLock::new(SessionInner::default())),
        })
    }

    /// Creates a session from the sync configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(
            config.token_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Runs the interactive sign-in.
    ///
    /// ## Flow
    /// 1. The injected consent flow asserts the identity and yields an
    ///    authorization code (or an explicit denial/cancellation).
    /// 2. The code is exchanged at the token endpoint for the scoped
    ///    access token.
    ///
    /// Only when both exchanges succeed does the session become
    /// `Authorized`; a failure leaves the cached state untouched.
    pub async fn sign_in(&self, flow: &dyn ConsentFlow) -> SyncResult<Identity> {
        self.inner.write().await.authenticating = true;

        let result = self.do_sign_in(flow).await;

        let mut inner = self.inner.write().await;
        inner.authenticating = false;

        match result {
            Ok((identity, token)) => {
                info!(
                    email = %identity.email,
                    expires_in_secs = token.remaining_secs(),
                    "Session authorized"
                );
                inner.identity = Some(identity.clone());
                inner.token = Some(token);
                Ok(identity)
            }
            Err(e) => {
                debug!(error = %e, "Sign-in did not complete");
                Err(e)
            }
        }
    }

    async fn do_sign_in(&self, flow: &dyn ConsentFlow) -> SyncResult<(Identity, TokenInfo)> {
        let outcome = flow.request_consent().await?;

        let (identity, code) = match outcome {
            ConsentOutcome::Granted {
                identity,
                authorization_code,
            } => (identity, authorization_code),
            ConsentOutcome::Denied => return Err(SyncError::ConsentDenied),
            ConsentOutcome::Cancelled => return Err(SyncError::ConsentCancelled),
        };

        debug!(email = %identity.email, "Identity asserted, exchanging authorization code");

        let token = self.exchange_code(&code).await?;
        Ok((identity, token))
    }

    /// Exchanges the authorization code for a scoped access token.
    async fn exchange_code(&self, code: &str) -> SyncResult<TokenInfo> {
        let response = self
            .http
            .post(&self.token_url)
            .json(&serde_json::json!({
                "grant_type": "authorization_code",
                "code": code,
            }))
            .send()
            .await
            .map_err(|e| SyncError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(SyncError::ExchangeFailed(format!(
                "{}: {}",
                status.as_u16(),
                preview
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::ExchangeFailed(format!("unreadable token response: {e}")))?;

        Ok(TokenInfo::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Returns the cached bearer credential if still usable.
    ///
    /// `None` means never acquired or known-expired: the caller should
    /// prompt for re-consent rather than attempt a doomed network call.
    pub async fn access_credential(&self) -> Option<String> {
        let inner = self.inner.read().await;
        match &inner.token {
            Some(token) if token.is_usable() => {
                debug!(remaining_secs = token.remaining_secs(), "Using cached credential");
                Some(token.access_token.clone())
            }
            _ => None,
        }
    }

    /// Clears the cached credential and identity.
    ///
    /// Used on explicit sign-out and on an authorization-denied response
    /// from the remote store.
    pub async fn invalidate(&self) {
        let mut inner = self.inner.write().await;
        if inner.token.is_some() || inner.identity.is_some() {
            warn!("Invalidating cached credential");
        }
        inner.token = None;
        inner.identity = None;
    }

    /// Returns the asserted identity, if any.
    pub async fn identity(&self) -> Option<Identity> {
        self.inner.read().await.identity.clone()
    }

    /// Returns true when a usable credential is cached.
    pub async fn is_authorized(&self) -> bool {
        self.access_credential().await.is_some()
    }

    /// Returns the observable session phase.
    pub async fn phase(&self) -> SessionPhase {
        let inner = self.inner.read().await;

        if inner.authenticating {
            return SessionPhase::Authenticating;
        }

        match (&inner.identity, &inner.token) {
            (_, Some(token)) if token.is_usable() => SessionPhase::Authorized,
            (_, Some(_)) => SessionPhase::Expired,
            (Some(_), None) => SessionPhase::Expired,
            (None, None) => SessionPhase::SignedOut,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_script, StubConsent};

    fn identity() -> Identity {
        Identity {
            email: "nabil@example.com".into(),
            display_name: "Nabil".into(),
            avatar_url: String::new(),
        }
    }

    #[test]
    fn test_token_usable_with_time_left() {
        let token = TokenInfo::new("tok".into(), Duration::from_secs(3600));
        assert!(token.is_usable());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_near_expiry_is_not_usable() {
        // 30 seconds left is inside the 60 second margin
        let token = TokenInfo::new("tok".into(), Duration::from_secs(30));
        assert!(!token.is_usable());
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn test_sign_in_grants_credential() {
        let (base_url, _server) = spawn_script(vec![(
            200,
            r#"{"access_token":"tok-1","expires_in":3600}"#.to_string(),
        )])
        .await;

        let session =
            CredentialSession::new(format!("{base_url}/token"), Duration::from_secs(5)).unwrap();
        assert_eq!(session.phase().await, SessionPhase::SignedOut);

        let flow = StubConsent::granted(identity(), "auth-code");
        let signed_in = session.sign_in(&flow).await.unwrap();

        assert_eq!(signed_in.email, "nabil@example.com");
        assert_eq!(session.access_credential().await.as_deref(), Some("tok-1"));
        assert_eq!(session.phase().await, SessionPhase::Authorized);
    }

    #[tokio::test]
    async fn test_consent_denied_leaves_session_signed_out() {
        let session =
            CredentialSession::new("http://127.0.0.1:9/token", Duration::from_secs(5)).unwrap();

        let err = session.sign_in(&StubConsent::denied()).await.unwrap_err();
        assert!(matches!(err, SyncError::ConsentDenied));

        assert_eq!(session.phase().await, SessionPhase::SignedOut);
        assert!(session.access_credential().await.is_none());
    }

    #[tokio::test]
    async fn test_consent_cancelled_is_explicit() {
        let session =
            CredentialSession::new("http://127.0.0.1:9/token", Duration::from_secs(5)).unwrap();

        let err = session.sign_in(&StubConsent::cancelled()).await.unwrap_err();
        assert!(matches!(err, SyncError::ConsentCancelled));
    }

    #[tokio::test]
    async fn test_failed_exchange_grants_nothing() {
        let (base_url, _server) =
            spawn_script(vec![(403, r#"{"error":"access_denied"}"#.to_string())]).await;

        let session =
            CredentialSession::new(format!("{base_url}/token"), Duration::from_secs(5)).unwrap();

        let err = session
            .sign_in(&StubConsent::granted(identity(), "bad-code"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ExchangeFailed(_)));
        assert!(session.access_credential().await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_clears_credential_and_identity() {
        let (base_url, _server) = spawn_script(vec![(
            200,
            r#"{"access_token":"tok-1","expires_in":3600}"#.to_string(),
        )])
        .await;

        let session =
            CredentialSession::new(format!("{base_url}/token"), Duration::from_secs(5)).unwrap();
        session
            .sign_in(&StubConsent::granted(identity(), "auth-code"))
            .await
            .unwrap();

        session.invalidate().await;

        assert!(session.access_credential().await.is_none());
        assert!(session.identity().await.is_none());
        assert_eq!(session.phase().await, SessionPhase::SignedOut);
    }
}
