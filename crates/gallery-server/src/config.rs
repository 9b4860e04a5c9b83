//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use gallery_config::GalleryConfig;

use crate::error::{Result, ServerError};

/// Default connect timeout for upstream calls (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Base URL of the content service requests are forwarded to.
    pub upstream: Url,

    /// Path prefix the proxy is mounted under, e.g. `/api`.
    pub proxy_prefix: String,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Connect timeout for upstream calls.
    pub connect_timeout: Duration,
}

impl ServerConfig {
    /// Create a config forwarding to `upstream`, with defaults for the rest.
    pub fn new(upstream: Url) -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            upstream,
            proxy_prefix: gallery_config::DEFAULT_PROXY_PREFIX.to_string(),
            cors_origins: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Build from the loaded application configuration.
    pub fn from_gallery_config(config: &GalleryConfig) -> Result<Self> {
        let bind_address = config
            .server
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| {
                ServerError::Config(format!(
                    "invalid bind address '{}': {}",
                    config.server.bind_address, e
                ))
            })?;

        Ok(Self::new(config.content.server_url()?)
            .with_bind_address(bind_address)
            .with_proxy_prefix(config.server.proxy_prefix.clone())
            .with_cors_origins(config.server.cors_origins.clone()))
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the proxy mount prefix. Surrounding slashes are normalized.
    pub fn with_proxy_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.proxy_prefix = format!("/{}", prefix.trim_matches('/'));
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the upstream connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
