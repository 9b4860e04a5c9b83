//! Gallery - authenticated access to a headless content service
//!
//! Main entry point for the gallery CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, browse, config, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Gallery - authenticated access to a headless content service
#[derive(Parser)]
#[command(name = "gallery")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML config file (environment variables still win)
    #[arg(long, global = true, env = "GALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the JSON log file
    #[arg(long, global = true, env = "GALLERY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Start(start::StartArgs),

    /// Upstream credential status
    Auth(auth::AuthArgs),

    /// Show the resolved configuration
    Config(config::ConfigArgs),

    /// Browse taxonomies, categories and items
    Browse(browse::BrowseArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

const CONSOLE_FILTER: &str = "gallery=info,gallery_server=info,gallery_auth=info,gallery_content=info,tower_http=info,warn";
const CONSOLE_FILTER_VERBOSE: &str = "gallery=debug,gallery_server=debug,gallery_auth=debug,gallery_content=debug,gallery_config=debug,tower_http=debug,info";
const FILE_FILTER: &str = "gallery=trace,gallery_server=trace,gallery_auth=trace,gallery_content=trace,gallery_config=trace,tower_http=debug,info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rolling JSON file when possible.
    let filter = if cli.verbose {
        CONSOLE_FILTER_VERBOSE
    } else {
        CONSOLE_FILTER
    };

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|d| d.join("gallery").join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"));

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("gallery")
        .filename_suffix("log")
        .build(&log_dir);

    let (file_writer, _guard) = match file_appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(e) => {
            eprintln!("warning: file logging disabled ({}): {}", log_dir.display(), e);
            (None, None)
        }
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(FILE_FILTER))
        }))
        .init();

    // Create context for commands
    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Browse(args) => browse::run(args, &ctx).await,
    }
}
