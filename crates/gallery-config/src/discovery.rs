//! Config loading: optional TOML file, then environment overlay.

use std::path::Path;

use crate::env::process_env;
use crate::error::{ConfigError, Result};
use crate::types::GalleryConfig;

/// Load a config file without applying the environment.
pub fn load_config_file(path: &Path) -> Result<GalleryConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    GalleryConfig::from_toml(&content)
}

/// Load the effective configuration.
///
/// Reads `path` when given, overlays the process environment and validates
/// the result.
pub fn load_config(path: Option<&Path>) -> Result<GalleryConfig> {
    load_config_with(path, process_env)
}

/// Same as [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GalleryConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config file");
            load_config_file(path)?
        }
        None => GalleryConfig::default(),
    };

    config.apply_env(lookup)?;
    config.validate()?;

    tracing::debug!(
        server_url = %config.content.server_url,
        preview = config.content.preview,
        auth_required = config.auth.is_auth_required(),
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [content]
            server_url = "https://content.example.com"
            channel_token = "abc"
            "#
        )
        .unwrap();

        let config = load_config_with(Some(file.path()), no_env).unwrap();
        assert_eq!(config.content.channel_token, "abc");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config_with(Some(missing.as_path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[content\nserver_url = ").unwrap();
        let err = load_config_with(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_only() {
        let config = load_config_with(None, |name| match name {
            "SERVER_URL" => Some("http://localhost:9000".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.content.server_url, "http://localhost:9000");
    }

    #[test]
    fn test_incomplete_oauth_rejected() {
        let err = load_config_with(None, |name| match name {
            "SERVER_URL" => Some("http://localhost:9000".to_string()),
            "CLIENT_ID" => Some("id".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }
}
