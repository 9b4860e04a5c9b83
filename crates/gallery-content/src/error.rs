//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Content service returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the service.
        code: String,
        /// Error message from the service.
        message: String,
    },

    /// Resolving the upstream credential failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] gallery_auth::AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource ID cannot be used as a path segment.
    #[error("Invalid resource ID: {0:?}")]
    InvalidId(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

impl From<gallery_config::ConfigError> for Error {
    fn from(e: gallery_config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the content service.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default, rename = "o:errorCode")]
    pub error_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = Error::Api {
            status: 404,
            code: "unknown".to_string(),
            message: "missing".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_server_error());

        let forbidden = Error::Api {
            status: 403,
            code: "unknown".to_string(),
            message: "nope".to_string(),
        };
        assert!(forbidden.is_auth_error());

        let unavailable = Error::Api {
            status: 503,
            code: "unknown".to_string(),
            message: "later".to_string(),
        };
        assert!(unavailable.is_server_error());
    }

    #[test]
    fn test_error_response_parses_service_shape() {
        let body = r#"{"title":"Item not found","status":404,"detail":"no such item","o:errorCode":"OCE-DELIVERY-ITEM-001"}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Item not found"));
        assert_eq!(parsed.error_code.as_deref(), Some("OCE-DELIVERY-ITEM-001"));
    }
}
