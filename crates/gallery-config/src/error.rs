//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// A value was present but could not be interpreted.
    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// A URL field failed to parse or uses an unsupported scheme.
    #[error("invalid URL '{url}' for {field}: {reason}")]
    InvalidUrl {
        field: String,
        url: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(field: &str, context: &str) -> Self {
        ConfigError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        }
    }
}
