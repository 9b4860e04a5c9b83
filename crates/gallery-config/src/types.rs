//! Configuration types.
//!
//! The file layout mirrors the struct layout:
//!
//! ```toml
//! [content]
//! server_url = "https://content.example.com"
//! api_version = "v1.1"
//! channel_token = "abc123"
//! preview = false
//!
//! [auth]
//! client_id = "gallery-app"
//! client_secret = "..."
//! scope = "https://content.example.com/urn:opc:cec:all"
//! idcs_url = "https://idcs.example.com"
//!
//! [server]
//! bind_address = "127.0.0.1:8080"
//! cors_origins = ["http://localhost:3000"]
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Default content API version.
pub const DEFAULT_API_VERSION: &str = "v1.1";

/// Default address the proxy server binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Default path prefix the proxy is mounted under.
pub const DEFAULT_PROXY_PREFIX: &str = "/api";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub content: ContentConfig,
    pub auth: AuthConfig,
    pub server: ServerSettings,
}

impl GalleryConfig {
    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that the configuration is usable.
    ///
    /// Requires a server URL with an `http` or `https` scheme and, when an
    /// OAuth client id is set, the remaining OAuth settings.
    pub fn validate(&self) -> Result<()> {
        self.content.server_url()?;
        self.auth.oauth()?;
        if let Some(public_url) = &self.server.public_url {
            parse_http_url("server.public_url", public_url)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings for the upstream content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base URL of the content service.
    pub server_url: String,
    /// Content API version, e.g. `v1.1`.
    pub api_version: String,
    /// Channel token identifying the content channel to query.
    pub channel_token: String,
    /// Query unpublished content through the preview API.
    pub preview: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            channel_token: String::new(),
            preview: false,
        }
    }
}

impl ContentConfig {
    /// Parsed server URL.
    pub fn server_url(&self) -> Result<Url> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::missing("server_url", "[content]"));
        }
        parse_http_url("content.server_url", &self.server_url)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Credential settings for the upstream content service.
///
/// Either a static `Authorization` value or an OAuth2 client-credentials
/// client. When both are present the static value wins.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static `Authorization` header value, e.g. `Basic dXNlcjpwYXNz`.
    pub static_auth: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Scope requested with the client-credentials grant.
    pub scope: Option<String>,
    /// Base URL of the identity service issuing tokens.
    pub idcs_url: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("static_auth", &self.static_auth.as_ref().map(|_| "<redacted>"))
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("scope", &self.scope)
            .field("idcs_url", &self.idcs_url)
            .finish()
    }
}

/// Complete OAuth2 client-credentials settings.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub idcs_url: Url,
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("idcs_url", &self.idcs_url.as_str())
            .finish()
    }
}

impl AuthConfig {
    /// Static credential, if one is configured.
    pub fn static_credential(&self) -> Option<&str> {
        self.static_auth.as_deref()
    }

    /// True iff a static value or an OAuth client id is configured.
    pub fn is_auth_required(&self) -> bool {
        self.static_auth.is_some() || self.client_id.is_some()
    }

    /// Complete OAuth settings, if a client id is configured.
    ///
    /// A client id without the secret or issuer URL is an error rather than
    /// silently disabling authentication.
    pub fn oauth(&self) -> Result<Option<OAuthSettings>> {
        let Some(client_id) = &self.client_id else {
            return Ok(None);
        };

        let client_secret = self
            .client_secret
            .clone()
            .ok_or_else(|| ConfigError::missing("client_secret", "[auth]"))?;
        let idcs_url = self
            .idcs_url
            .as_deref()
            .ok_or_else(|| ConfigError::missing("idcs_url", "[auth]"))?;
        let idcs_url = parse_http_url("auth.idcs_url", idcs_url)?;

        Ok(Some(OAuthSettings {
            client_id: client_id.clone(),
            client_secret,
            scope: self.scope.clone().unwrap_or_default(),
            idcs_url,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the local proxy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `127.0.0.1:8080`.
    pub bind_address: String,
    /// Browser-visible origin of this application. Browser-side content
    /// clients reach the proxy through it.
    pub public_url: Option<String>,
    /// Path prefix the proxy is mounted under.
    pub proxy_prefix: String,
    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            public_url: None,
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    /// URL browser clients use to reach the proxy.
    ///
    /// Falls back to `http://<bind_address>` when no public URL is set.
    pub fn proxy_url(&self) -> Result<Url> {
        let origin = match &self.public_url {
            Some(url) => url.clone(),
            None => format!("http://{}", self.bind_address),
        };
        let mut url = parse_http_url("server.public_url", &origin)?;
        let prefix = self.proxy_prefix.trim_matches('/');
        url.set_path(&format!("{}/", prefix));
        Ok(url)
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field: field.to_string(),
        url: value.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            url: value.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
