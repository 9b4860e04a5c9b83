//! Environment variable overlay.
//!
//! Variables recognized (empty values are treated as unset):
//!
//! | Variable | Field |
//! |---|---|
//! | `SERVER_URL` | `content.server_url` |
//! | `API_VERSION` | `content.api_version` |
//! | `CHANNEL_TOKEN` | `content.channel_token` |
//! | `PREVIEW` | `content.preview` |
//! | `AUTH` | `auth.static_auth` |
//! | `CLIENT_ID` | `auth.client_id` |
//! | `CLIENT_SECRET` | `auth.client_secret` |
//! | `CLIENT_SCOPE_URL` | `auth.scope` |
//! | `IDCS_URL` | `auth.idcs_url` |
//! | `GALLERY_BIND` | `server.bind_address` |
//! | `GALLERY_PUBLIC_URL` | `server.public_url` |
//! | `GALLERY_CORS_ORIGINS` | `server.cors_origins` (comma separated) |

use crate::error::{ConfigError, Result};
use crate::types::GalleryConfig;

pub const SERVER_URL: &str = "SERVER_URL";
pub const API_VERSION: &str = "API_VERSION";
pub const CHANNEL_TOKEN: &str = "CHANNEL_TOKEN";
pub const PREVIEW: &str = "PREVIEW";
pub const AUTH: &str = "AUTH";
pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const CLIENT_SCOPE_URL: &str = "CLIENT_SCOPE_URL";
pub const IDCS_URL: &str = "IDCS_URL";
pub const GALLERY_BIND: &str = "GALLERY_BIND";
pub const GALLERY_PUBLIC_URL: &str = "GALLERY_PUBLIC_URL";
pub const GALLERY_CORS_ORIGINS: &str = "GALLERY_CORS_ORIGINS";

impl GalleryConfig {
    /// Build a config from the process environment alone.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(process_env)?;
        Ok(config)
    }

    /// Overlay values from a variable lookup onto this config.
    ///
    /// The lookup is a parameter so tests don't need to touch the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(SERVER_URL) {
            self.content.server_url = v;
        }
        if let Some(v) = get(API_VERSION) {
            self.content.api_version = v;
        }
        if let Some(v) = get(CHANNEL_TOKEN) {
            self.content.channel_token = v;
        }
        if let Some(v) = get(PREVIEW) {
            self.content.preview = parse_bool(PREVIEW, &v)?;
        }

        if let Some(v) = get(AUTH) {
            self.auth.static_auth = Some(v);
        }
        if let Some(v) = get(CLIENT_ID) {
            self.auth.client_id = Some(v);
        }
        if let Some(v) = get(CLIENT_SECRET) {
            self.auth.client_secret = Some(v);
        }
        if let Some(v) = get(CLIENT_SCOPE_URL) {
            self.auth.scope = Some(v);
        }
        if let Some(v) = get(IDCS_URL) {
            self.auth.idcs_url = Some(v);
        }

        if let Some(v) = get(GALLERY_BIND) {
            self.server.bind_address = v;
        }
        if let Some(v) = get(GALLERY_PUBLIC_URL) {
            self.server.public_url = Some(v);
        }
        if let Some(v) = get(GALLERY_CORS_ORIGINS) {
            self.server.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }
}

/// Lookup against the real process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parse a boolean flag the way shell users write them.
pub fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
