//! OAuth 2.0 client-credentials grant against the identity service.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use gallery_config::OAuthSettings;

use crate::credential::Credential;
use crate::error::{AuthError, Result};
use crate::token_cache::{FetchedToken, TokenSource};

/// Token endpoint path relative to the identity service base URL.
pub const TOKEN_PATH: &str = "oauth2/v1/token";

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Build the token endpoint URL for an identity service base URL.
///
/// Any path on the base URL is kept, so tenant-scoped issuers work.
pub fn token_endpoint(idcs_url: &Url) -> Result<Url> {
    let base = idcs_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/{}", base, TOKEN_PATH))
        .map_err(|e| AuthError::Config(format!("Invalid token endpoint: {}", e)))
}

/// Fetches bearer tokens with the client-credentials grant.
///
/// Client id and secret travel as HTTP Basic auth; the scope goes in the
/// form body.
#[derive(Clone)]
pub struct ClientCredentialsSource {
    client: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl std::fmt::Debug for ClientCredentialsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsSource")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ClientCredentialsSource {
    /// Create a source from complete OAuth settings.
    pub fn new(settings: &OAuthSettings) -> Result<Self> {
        Self::with_client(settings, reqwest::Client::new())
    }

    /// Create a source that sends requests through the given client.
    pub fn with_client(settings: &OAuthSettings, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            client,
            token_url: token_endpoint(&settings.idcs_url)?,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: settings.scope.clone(),
        })
    }

    /// The token endpoint this source posts to.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }

    fn form_body(&self) -> String {
        format!(
            "grant_type=client_credentials&scope={}",
            urlencoding::encode(&self.scope)
        )
    }

    /// Request a new access token.
    pub async fn request_token(&self) -> Result<TokenResponse> {
        tracing::debug!(url = %self.token_url, "Requesting client-credentials token");

        let response = self
            .client
            .post(self.token_url.clone())
            .header(AUTHORIZATION, self.basic_auth())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.form_body())
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(AuthError::Backend {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::Parse(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn fetch_token(&self) -> Result<FetchedToken> {
        let response = self.request_token().await?;
        Ok(FetchedToken {
            credential: Credential::bearer(&response.access_token),
            expires_in: Duration::from_secs(response.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(idcs_url: &str) -> OAuthSettings {
        OAuthSettings {
            client_id: "gallery".to_string(),
            client_secret: "s3cret".to_string(),
            scope: "https://content.example.com/urn:opc:cec:all".to_string(),
            idcs_url: Url::parse(idcs_url).unwrap(),
        }
    }

    #[test]
    fn test_token_endpoint() {
        let url = token_endpoint(&Url::parse("https://idcs.example.com").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://idcs.example.com/oauth2/v1/token");

        let url = token_endpoint(&Url::parse("https://idcs.example.com/tenant/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://idcs.example.com/tenant/oauth2/v1/token");
    }

    #[test]
    fn test_basic_auth() {
        let source = ClientCredentialsSource::new(&settings("https://idcs.example.com")).unwrap();
        // base64("gallery:s3cret")
        assert_eq!(source.basic_auth(), "Basic Z2FsbGVyeTpzM2NyZXQ=");
    }

    #[test]
    fn test_form_body_encodes_scope() {
        let source = ClientCredentialsSource::new(&settings("https://idcs.example.com")).unwrap();
        assert_eq!(
            source.form_body(),
            "grant_type=client_credentials&scope=https%3A%2F%2Fcontent.example.com%2Furn%3Aopc%3Acec%3Aall"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let source = ClientCredentialsSource::new(&settings("https://idcs.example.com")).unwrap();
        assert!(!format!("{:?}", source).contains("s3cret"));
    }
}
