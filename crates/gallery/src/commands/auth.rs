//! Auth command - upstream credential status.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use gallery_auth::AuthMode;

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Show where upstream credentials come from
    Status {
        /// Obtain a token now and report its expiry (client-credentials only)
        #[arg(long)]
        fetch: bool,
    },
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Status { fetch } => cmd_status(fetch, ctx).await,
    }
}

async fn cmd_status(fetch: bool, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let resolver = ctx.auth_resolver(&config)?;
    let mode = resolver.mode();

    if fetch && mode == AuthMode::ClientCredentials {
        resolver
            .resolve_credential()
            .await
            .map_err(|e| anyhow::anyhow!("Token request failed: {}", e))?;
    }

    let info = resolver.token_info().await;

    if ctx.json_output {
        let token = info.as_ref().map(|info| {
            json!({
                "obtained_at": info.obtained_at.to_rfc3339(),
                "expires_in_secs": info.expires_in.as_secs(),
                "is_expired": info.is_expired,
            })
        });
        let output = json!({
            "mode": mode.to_string(),
            "auth_required": resolver.is_auth_required(),
            "client_id": config.auth.client_id,
            "token": token,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Upstream Authentication");
    println!("-----------------------");
    println!("Mode: {}", mode);

    match mode {
        AuthMode::None => {
            println!("  Requests go to the content service without credentials.");
        }
        AuthMode::Static => {
            println!("  A fixed Authorization value from AUTH is attached.");
        }
        AuthMode::ClientCredentials => {
            if let Some(client_id) = &config.auth.client_id {
                println!("  Client ID: {}", client_id);
            }
            match info {
                Some(info) => {
                    println!("  Obtained: {}", info.obtained_at.to_rfc3339());
                    println!("  Expires: {}", info.expires_in_display());
                }
                None => {
                    println!("  No token cached yet.");
                    println!("  Run 'gallery auth status --fetch' to request one.");
                }
            }
        }
    }

    Ok(())
}
