//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use gallery_config::GalleryConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secrets redacted)
    Show,

    /// Print a config file template
    Init,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Init => cmd_init(),
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let proxy_url = config.server.proxy_url()?;

    if ctx.json_output {
        let output = json!({
            "content": {
                "server_url": config.content.server_url,
                "api_version": config.content.api_version,
                "channel_token": config.content.channel_token,
                "preview": config.content.preview,
            },
            "auth": {
                "static_auth": redacted(&config.auth.static_auth),
                "client_id": config.auth.client_id,
                "client_secret": redacted(&config.auth.client_secret),
                "scope": config.auth.scope,
                "idcs_url": config.auth.idcs_url,
            },
            "server": {
                "bind_address": config.server.bind_address,
                "public_url": config.server.public_url,
                "proxy_prefix": config.server.proxy_prefix,
                "proxy_url": proxy_url.as_str(),
                "cors_origins": config.server.cors_origins,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Content");
    println!("  Server URL:    {}", config.content.server_url);
    println!("  API version:   {}", config.content.api_version);
    println!("  Channel token: {}", config.content.channel_token);
    println!(
        "  Mode:          {}",
        if config.content.preview { "preview" } else { "delivery" }
    );
    println!();
    println!("Auth");
    println!(
        "  Static:        {}",
        redacted(&config.auth.static_auth).unwrap_or("(not set)")
    );
    println!(
        "  Client ID:     {}",
        config.auth.client_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  Client secret: {}",
        redacted(&config.auth.client_secret).unwrap_or("(not set)")
    );
    println!(
        "  Scope:         {}",
        config.auth.scope.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  IDCS URL:      {}",
        config.auth.idcs_url.as_deref().unwrap_or("(not set)")
    );
    println!();
    println!("Server");
    println!("  Bind:          {}", config.server.bind_address);
    println!("  Proxy URL:     {}", proxy_url);
    if !config.server.cors_origins.is_empty() {
        println!("  CORS origins:  {}", config.server.cors_origins.join(", "));
    }

    Ok(())
}

fn cmd_init() -> Result<()> {
    let mut template = GalleryConfig::default();
    template.content.server_url = "https://content.example.com".to_string();
    template.content.channel_token = "<channel token>".to_string();

    print!("{}", toml_template(&template)?);
    Ok(())
}

fn toml_template(config: &GalleryConfig) -> Result<String> {
    Ok(format!(
        "# Gallery configuration. Environment variables override these values.\n{}",
        config.to_toml()?
    ))
}
