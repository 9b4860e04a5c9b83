//! Bearer token caching with expiry-based refresh.
//!
//! The cache holds at most one token. A token is served while more than
//! [`REFRESH_BUFFER`] remains before it expires; after that the next caller
//! fetches a replacement from the [`TokenSource`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::credential::Credential;
use crate::error::{AuthError, Result};

/// Remaining lifetime below which a cached token is refreshed.
pub const REFRESH_BUFFER: Duration = Duration::from_secs(5);

// ============================================================================
// TokenSource Trait
// ============================================================================

/// A token freshly obtained from an issuer.
#[derive(Debug, Clone)]
pub struct FetchedToken {
    pub credential: Credential,
    /// Lifetime reported by the issuer.
    pub expires_in: Duration,
}

/// Something that can mint a new token.
#[async_trait]
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    async fn fetch_token(&self) -> Result<FetchedToken>;
}

// ============================================================================
// TokenCache
// ============================================================================

#[derive(Debug, Clone)]
struct CachedToken {
    credential: Credential,
    expires_at: Instant,
    obtained_at: chrono::DateTime<chrono::Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_BUFFER < self.expires_at
    }
}

/// Single-token cache in front of a [`TokenSource`].
///
/// Value and expiry are replaced together, and only after a successful
/// fetch. Concurrent callers that find the cache stale share one refresh:
/// whoever holds the refresh guard fetches, the rest re-check the cache once
/// the guard is released.
#[derive(Debug)]
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    state: RwLock<Option<CachedToken>>,
    refresh_guard: Mutex<()>,
}

impl TokenCache {
    /// Create an empty cache over the given source.
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Create an empty cache over a shared source.
    pub fn with_shared_source(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            state: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Get a usable credential, refreshing if the cached one is missing or
    /// about to expire.
    pub async fn get_credential(&self) -> Result<Credential> {
        if let Some(credential) = self.fresh_credential().await {
            return Ok(credential);
        }

        let _guard = self.refresh_guard.lock().await;

        // Another caller may have refreshed while we waited for the guard.
        if let Some(credential) = self.fresh_credential().await {
            tracing::debug!("Token refreshed by concurrent caller");
            return Ok(credential);
        }

        tracing::info!("Token missing or near expiry, refreshing");
        let requested_at = Instant::now();
        let fetched = self.source.fetch_token().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Token refresh failed");
        })?;

        let Some(expires_at) = requested_at.checked_add(fetched.expires_in) else {
            tracing::warn!(
                expires_in_secs = fetched.expires_in.as_secs(),
                "Token lifetime out of range"
            );
            return Err(AuthError::Parse("expires_in out of range".to_string()));
        };

        let token = CachedToken {
            credential: fetched.credential.clone(),
            expires_at,
            obtained_at: chrono::Utc::now(),
        };
        *self.state.write().await = Some(token);

        tracing::info!(
            expires_in_secs = fetched.expires_in.as_secs(),
            "Token refreshed successfully"
        );
        Ok(fetched.credential)
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn clear(&self) {
        *self.state.write().await = None;
    }

    /// Expiry information about the cached token, without its value.
    pub async fn token_info(&self) -> Option<TokenInfo> {
        let state = self.state.read().await;
        state.as_ref().map(|token| {
            let now = Instant::now();
            TokenInfo {
                obtained_at: token.obtained_at,
                expires_in: token.expires_at.saturating_duration_since(now),
                is_expired: !token.is_fresh(now),
            }
        })
    }

    async fn fresh_credential(&self) -> Option<Credential> {
        let state = self.state.read().await;
        state
            .as_ref()
            .filter(|token| token.is_fresh(Instant::now()))
            .map(|token| token.credential.clone())
    }
}

// ============================================================================
// TokenInfo
// ============================================================================

/// Information about the cached token for display.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub obtained_at: chrono::DateTime<chrono::Utc>,
    pub expires_in: Duration,
    /// True once inside the refresh buffer.
    pub is_expired: bool,
}

impl TokenInfo {
    pub fn expires_in_display(&self) -> String {
        if self.is_expired {
            "Expired (will refresh on next use)".to_string()
        } else {
            let secs = self.expires_in.as_secs();
            let hours = secs / 3600;
            let minutes = (secs % 3600) / 60;
            format!("{}h {}m", hours, minutes)
        }
    }
}
