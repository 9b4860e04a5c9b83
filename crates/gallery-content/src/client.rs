//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use url::Url;

use gallery_auth::SharedAuthResolver;

use crate::api::{ItemsApi, TaxonomiesApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameter carrying the channel token.
const CHANNEL_TOKEN_PARAM: &str = "channelToken";

/// Which content the client can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// Published content only.
    #[default]
    Delivery,
    /// Published plus unpublished and secured content.
    Preview,
}

impl ContentMode {
    /// Pick the mode from the `preview` config flag.
    pub fn from_preview(preview: bool) -> Self {
        if preview {
            ContentMode::Preview
        } else {
            ContentMode::Delivery
        }
    }

    /// API path segment for this mode.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentMode::Delivery => "published",
            ContentMode::Preview => "preview",
        }
    }
}

/// Content service client.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use gallery_content::ContentClient;
///
/// # async fn example() -> gallery_content::Result<()> {
/// let client = ContentClient::builder()
///     .base_url("https://content.example.com")
///     .channel_token("abc123")
///     .build()?;
///
/// let taxonomies = client.taxonomies().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    channel_token: String,
    mode: ContentMode,
    timeout: Duration,
    /// Resolves the credential right before each request.
    auth: Option<SharedAuthResolver>,
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_version", &self.inner.api_version)
            .field("mode", &self.inner.mode)
            .field("attaches_credentials", &self.attaches_credentials())
            .finish()
    }
}

impl ContentClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn mode(&self) -> ContentMode {
        self.inner.mode
    }

    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// Whether requests carry an `Authorization` header.
    pub fn attaches_credentials(&self) -> bool {
        self.inner
            .auth
            .as_ref()
            .is_some_and(|auth| auth.is_auth_required())
    }

    /// True if both handles share the same underlying instance.
    pub fn ptr_eq(&self, other: &ContentClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the items API.
    pub fn items(&self) -> ItemsApi {
        ItemsApi::new(self.clone())
    }

    /// Access the taxonomies API.
    pub fn taxonomies(&self) -> TaxonomiesApi {
        TaxonomiesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a content API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!(
                "content/{}/api/{}/{}",
                self.inner.mode.path_segment(),
                self.inner.api_version,
                path
            ))
            .map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.get(self.url(path)?);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let request = self.inner.http.get(self.url(path)?).query(query);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Finish a request: channel token, timeout and the credential hook.
    ///
    /// The credential is resolved per request so a refreshed token is picked
    /// up without rebuilding the client.
    async fn send(&self, mut request: RequestBuilder) -> Result<reqwest::Response> {
        if !self.inner.channel_token.is_empty() {
            request = request.query(&[(CHANNEL_TOKEN_PARAM, self.inner.channel_token.as_str())]);
        }

        if let Some(auth) = &self.inner.auth {
            if let Some(credential) = auth.resolve_credential().await? {
                request = request.header(AUTHORIZATION, credential.to_header_value()?);
            }
        }

        Ok(request.timeout(self.inner.timeout).send().await?)
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let url = response.url().path().to_string();

        let parsed = response.json::<ErrorResponse>().await.unwrap_or_default();
        let message = parsed
            .detail
            .or(parsed.title)
            .unwrap_or_else(|| format!("HTTP {}", status));

        tracing::debug!(status, url = %url, message = %message, "Content API error");

        if status == 404 {
            Error::NotFound(message)
        } else {
            Error::Api {
                status,
                code: parsed.error_code.unwrap_or_else(|| "unknown".to_string()),
                message,
            }
        }
    }
}

/// Builder for creating a [`ContentClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_version: String,
    channel_token: String,
    mode: ContentMode,
    timeout: Duration,
    auth: Option<SharedAuthResolver>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_version: gallery_config::DEFAULT_API_VERSION.to_string(),
            channel_token: String::new(),
            mode: ContentMode::Delivery,
            timeout: DEFAULT_TIMEOUT,
            auth: None,
            user_agent: None,
        }
    }

    /// Set the base URL of the content service (or of the proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the content API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the channel token.
    pub fn channel_token(mut self, token: impl Into<String>) -> Self {
        self.channel_token = token.into();
        self
    }

    /// Select delivery or preview mode.
    pub fn mode(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a resolver consulted before every request.
    pub fn auth(mut self, resolver: SharedAuthResolver) -> Self {
        self.auth = Some(resolver);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ContentClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        if self.api_version.trim().is_empty() {
            return Err(Error::Config("api_version must not be empty".to_string()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("gallery-content/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(ContentClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_version: self.api_version,
                channel_token: self.channel_token,
                mode: self.mode,
                timeout: self.timeout,
                auth: self.auth,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
