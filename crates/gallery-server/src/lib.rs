//! HTTP server fronting the gallery content service.
//!
//! Browser-side code cannot hold the upstream credential, so when the
//! content service requires authentication it talks to this server instead.
//! Requests under the proxy prefix are forwarded upstream with the
//! credential attached.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gallery_auth::AuthResolver;
//! use gallery_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new("https://content.example.com".parse()?)
//!     .with_bind_address("127.0.0.1:8080".parse()?);
//! let auth = Arc::new(AuthResolver::with_static("Basic dXNlcjpwYXNz"));
//!
//! let server = Server::new(config, auth)?;
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use proxy::{ProxyHandler, Transport, rewrite_target};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::any;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use gallery_auth::SharedAuthResolver;

/// The gallery proxy server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration and credential source.
    pub fn new(config: ServerConfig, auth: SharedAuthResolver) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config, auth)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let prefix = self.state.config.proxy_prefix.trim_end_matches('/');

        let mut router = Router::new()
            .merge(routes::health_routes())
            .route(&format!("{}/{{*path}}", prefix), any(routes::proxy_handler));

        if let Some(cors) = self.cors_layer() {
            router = router.layer(cors);
        }

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins = &self.state.config.cors_origins;
        if origins.is_empty() {
            return None;
        }

        if origins.iter().any(|o| o == "*") {
            return Some(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
        }

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = self.bind().await?;
        let router = self.router();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Serve in a background task, returning the bound address.
    ///
    /// Binding to port 0 picks a free port.
    pub async fn spawn(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<SocketAddr> {
        let listener = self.bind().await?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Server error");
            }
        });

        Ok(local_addr)
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    async fn bind(&self) -> Result<TcpListener> {
        let addr = self.bind_address();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        let local = listener.local_addr().unwrap_or(addr);
        info!(
            addr = %local,
            upstream = %self.state.config.upstream,
            prefix = %self.state.config.proxy_prefix,
            auth = %self.state.auth.mode(),
            "Starting gallery proxy"
        );
        Ok(listener)
    }
}
