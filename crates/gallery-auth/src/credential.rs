//! The `Authorization` header value handed to upstream requests.

use reqwest::header::HeaderValue;

use crate::error::{AuthError, Result};

/// An opaque `Authorization` header value such as `Basic <b64>` or
/// `Bearer <token>`.
///
/// `Debug` shows only the scheme.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a header value as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a `Bearer` credential from a raw access token.
    pub fn bearer(access_token: &str) -> Self {
        Self(format!("Bearer {}", access_token))
    }

    /// The header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Authentication scheme, e.g. `Bearer`.
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once(' ').map(|(scheme, _)| scheme)
    }

    /// Convert into a header value marked sensitive.
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.0)
            .map_err(|_| AuthError::Config("credential is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.scheme() {
            Some(scheme) => write!(f, "Credential({} <redacted>)", scheme),
            None => write!(f, "Credential(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer() {
        let credential = Credential::bearer("abc");
        assert_eq!(credential.as_str(), "Bearer abc");
        assert_eq!(credential.scheme(), Some("Bearer"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("Basic dXNlcjpwYXNz");
        let debug = format!("{:?}", credential);
        assert_eq!(debug, "Credential(Basic <redacted>)");
        assert!(!debug.contains("dXNlcjpwYXNz"));
    }

    #[test]
    fn test_header_value_is_sensitive() {
        let value = Credential::bearer("abc").to_header_value().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_invalid_header_value() {
        assert!(Credential::new("Bearer a\nb").to_header_value().is_err());
    }
}
