//! Start command - launches the proxy server.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;

use gallery_server::{Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file and environment values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address to bind to, e.g. 0.0.0.0:8080 (overrides GALLERY_BIND)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Mount prefix for the proxy (default: /api)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Allowed CORS origin (can be specified multiple times)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.load_config()?;

    if let Some(bind) = args.bind {
        config.server.bind_address = bind.to_string();
    }
    if let Some(prefix) = args.prefix {
        config.server.proxy_prefix = prefix;
    }
    if !args.cors_origins.is_empty() {
        config.server.cors_origins = args.cors_origins;
    }

    let auth = ctx.auth_resolver(&config)?;
    let server_config =
        ServerConfig::from_gallery_config(&config).context("Invalid server configuration")?;

    if ctx.verbose {
        eprintln!("Upstream: {}", server_config.upstream);
        eprintln!("Auth: {}", auth.mode());
        eprintln!("Proxy: {}{}", server_config.bind_address, server_config.proxy_prefix);
    }

    let server = Server::new(server_config, auth)?;
    server.run_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
