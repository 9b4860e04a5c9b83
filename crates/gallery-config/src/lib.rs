//! Configuration for the gallery content proxy.
//!
//! Settings come from an optional TOML file overlaid with environment
//! variables (see [`env`] for the variable names). The result is immutable for
//! the lifetime of the process.

pub mod discovery;
pub mod env;
pub mod error;
pub mod types;

pub use discovery::{load_config, load_config_file, load_config_with};
pub use error::{ConfigError, Result};
pub use types::{
    AuthConfig, ContentConfig, DEFAULT_API_VERSION, DEFAULT_BIND_ADDRESS, DEFAULT_PROXY_PREFIX,
    GalleryConfig, OAuthSettings, ServerSettings,
};
