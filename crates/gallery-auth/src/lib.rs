//! Upstream credential resolution for the gallery content service.
//!
//! # Components
//!
//! - [`credential`]: the opaque `Authorization` value
//! - [`token_cache`]: single-token cache with expiry-based, single-flight refresh
//! - [`oauth`]: OAuth2 client-credentials grant (the production [`TokenSource`])
//! - [`resolver`]: picks static, OAuth or no credential from configuration

pub mod credential;
pub mod error;
pub mod oauth;
pub mod resolver;
pub mod token_cache;

pub use credential::Credential;
pub use error::{AuthError, Result};
pub use oauth::{ClientCredentialsSource, TokenResponse};
pub use resolver::{AuthMode, AuthResolver, SharedAuthResolver};
pub use token_cache::{FetchedToken, REFRESH_BUFFER, TokenCache, TokenInfo, TokenSource};
