//! CLI command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use gallery_auth::{AuthResolver, SharedAuthResolver};
use gallery_config::GalleryConfig;

pub mod auth;
pub mod browse;
pub mod config;
pub mod start;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if any.
    pub config_path: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load configuration from the config file (if any) and the environment.
    pub fn load_config(&self) -> Result<GalleryConfig> {
        let config = gallery_config::load_config(self.config_path.as_deref())
            .context("Failed to load configuration")?;

        if self.verbose {
            match &self.config_path {
                Some(path) => eprintln!("Loaded config: {}", path.display()),
                None => eprintln!("No config file, using environment"),
            }
        }

        Ok(config)
    }

    /// Build the upstream credential resolver for a configuration.
    pub fn auth_resolver(&self, config: &GalleryConfig) -> Result<SharedAuthResolver> {
        let resolver =
            AuthResolver::from_config(&config.auth).context("Invalid auth configuration")?;
        Ok(Arc::new(resolver))
    }
}
