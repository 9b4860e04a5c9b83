//! Decides whether upstream calls need a credential and where it comes from.

use std::sync::Arc;

use gallery_config::AuthConfig;

use crate::credential::Credential;
use crate::error::Result;
use crate::oauth::ClientCredentialsSource;
use crate::token_cache::{TokenCache, TokenInfo};

/// Where credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Upstream is public; no credential attached.
    None,
    /// A fixed `Authorization` value from configuration.
    Static,
    /// Bearer tokens from the client-credentials grant.
    ClientCredentials,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::None => write!(f, "none"),
            AuthMode::Static => write!(f, "static"),
            AuthMode::ClientCredentials => write!(f, "oauth2 client credentials"),
        }
    }
}

#[derive(Debug)]
enum AuthSource {
    None,
    Static(Credential),
    ClientCredentials(TokenCache),
}

/// Resolves the credential for upstream requests.
///
/// A static value always wins over OAuth settings. The resolver owns the
/// token cache, so one resolver means one cached token.
#[derive(Debug)]
pub struct AuthResolver {
    source: AuthSource,
}

/// Shared resolver for use across async contexts.
pub type SharedAuthResolver = Arc<AuthResolver>;

impl AuthResolver {
    /// A resolver that never attaches a credential.
    pub fn anonymous() -> Self {
        Self {
            source: AuthSource::None,
        }
    }

    /// A resolver that always returns `value`.
    pub fn with_static(value: impl Into<String>) -> Self {
        Self {
            source: AuthSource::Static(Credential::new(value)),
        }
    }

    /// A resolver backed by a token cache.
    pub fn with_token_cache(cache: TokenCache) -> Self {
        Self {
            source: AuthSource::ClientCredentials(cache),
        }
    }

    /// Build a resolver from configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if let Some(value) = config.static_credential() {
            tracing::debug!("Using static upstream credential");
            return Ok(Self::with_static(value));
        }

        match config.oauth()? {
            Some(settings) => {
                let source = ClientCredentialsSource::new(&settings)?;
                tracing::debug!(
                    client_id = %settings.client_id,
                    token_url = %source.token_url(),
                    "Using OAuth2 client-credentials upstream credential"
                );
                Ok(Self::with_token_cache(TokenCache::new(source)))
            }
            None => Ok(Self::anonymous()),
        }
    }

    /// Where credentials come from.
    pub fn mode(&self) -> AuthMode {
        match self.source {
            AuthSource::None => AuthMode::None,
            AuthSource::Static(_) => AuthMode::Static,
            AuthSource::ClientCredentials(_) => AuthMode::ClientCredentials,
        }
    }

    /// True iff upstream calls need a credential.
    pub fn is_auth_required(&self) -> bool {
        self.mode() != AuthMode::None
    }

    /// The credential to attach to the next upstream call, if any.
    ///
    /// Only the client-credentials mode can touch the network, and only when
    /// the cached token is missing or about to expire.
    pub async fn resolve_credential(&self) -> Result<Option<Credential>> {
        match &self.source {
            AuthSource::None => Ok(None),
            AuthSource::Static(credential) => Ok(Some(credential.clone())),
            AuthSource::ClientCredentials(cache) => cache.get_credential().await.map(Some),
        }
    }

    /// Expiry of the cached token in client-credentials mode.
    pub async fn token_info(&self) -> Option<TokenInfo> {
        match &self.source {
            AuthSource::ClientCredentials(cache) => cache.token_info().await,
            _ => None,
        }
    }
}
