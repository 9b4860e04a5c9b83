//! Memoized content clients per call context.
//!
//! Server-side code talks to the content service directly and attaches the
//! upstream credential itself. Code running in the browser must never hold
//! that credential, so when authentication is required its client targets
//! this application's proxy instead.

use std::sync::OnceLock;
use std::time::Duration;

use url::Url;

use gallery_auth::SharedAuthResolver;
use gallery_config::{ContentConfig, GalleryConfig};

use crate::client::{ContentClient, ContentMode};
use crate::error::Result;

/// Where the client's requests originate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    /// Server-side rendering and data fetching.
    Server,
    /// Code shipped to and run by the browser.
    Browser,
}

/// Hands out one long-lived [`ContentClient`] per [`CallContext`].
#[derive(Debug)]
pub struct ClientFactory {
    content: ContentConfig,
    proxy_url: Url,
    auth: SharedAuthResolver,
    timeout: Option<Duration>,
    server: OnceLock<ContentClient>,
    browser: OnceLock<ContentClient>,
}

impl ClientFactory {
    /// Create a factory.
    ///
    /// `proxy_url` is the browser-visible URL of this application's proxy
    /// mount, e.g. `https://gallery.example.com/api/`.
    pub fn new(content: ContentConfig, proxy_url: Url, auth: SharedAuthResolver) -> Self {
        Self {
            content,
            proxy_url,
            auth,
            timeout: None,
            server: OnceLock::new(),
            browser: OnceLock::new(),
        }
    }

    /// Create a factory from the loaded configuration.
    pub fn from_config(config: &GalleryConfig, auth: SharedAuthResolver) -> Result<Self> {
        Ok(Self::new(
            config.content.clone(),
            config.server.proxy_url()?,
            auth,
        ))
    }

    /// Override the request timeout of the clients this factory builds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the client for a context, building it on first use.
    pub fn get_client(&self, context: CallContext) -> Result<ContentClient> {
        let cell = match context {
            CallContext::Server => &self.server,
            CallContext::Browser => &self.browser,
        };

        if let Some(client) = cell.get() {
            return Ok(client.clone());
        }

        let built = self.build(context)?;
        // A concurrent first call may have won; everyone gets the stored one.
        Ok(cell.get_or_init(|| built).clone())
    }

    fn build(&self, context: CallContext) -> Result<ContentClient> {
        let mode = ContentMode::from_preview(self.content.preview);
        let auth_required = self.auth.is_auth_required();

        let mut builder = ContentClient::builder()
            .api_version(self.content.api_version.clone())
            .channel_token(self.content.channel_token.clone())
            .mode(mode);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match context {
            CallContext::Server => {
                let builder = builder.base_url(self.content.server_url()?.to_string());
                if auth_required {
                    builder.auth(self.auth.clone())
                } else {
                    builder
                }
            }
            CallContext::Browser if auth_required => builder.base_url(self.proxy_url.to_string()),
            CallContext::Browser => builder.base_url(self.content.server_url()?.to_string()),
        };

        let client = builder.build()?;
        tracing::debug!(
            context = ?context,
            mode = ?mode,
            base_url = %client.base_url(),
            attaches_credentials = client.attaches_credentials(),
            "Content client created"
        );
        Ok(client)
    }
}
