//! Error types for credential resolution.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while resolving a credential.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Network/HTTP error talking to the token endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// Token endpoint answered with a non-success status.
    #[error("Token endpoint error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Token endpoint response could not be parsed.
    #[error("Malformed token response: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}

impl From<gallery_config::ConfigError> for AuthError {
    fn from(e: gallery_config::ConfigError) -> Self {
        AuthError::Config(e.to_string())
    }
}
