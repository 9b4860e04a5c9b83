//! Application state shared across handlers.

use std::sync::Arc;

use gallery_auth::SharedAuthResolver;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::proxy::ProxyHandler;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Forwards requests under the proxy prefix.
    pub proxy: Arc<ProxyHandler>,

    /// Upstream credential source, shared with the proxy.
    pub auth: SharedAuthResolver,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ServerConfig, auth: SharedAuthResolver) -> Result<Self> {
        let proxy = ProxyHandler::new(&config, auth.clone())?;
        Ok(Self {
            config: Arc::new(config),
            proxy: Arc::new(proxy),
            auth,
        })
    }
}
