//! Typed client for the gallery content service.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gallery_auth::AuthResolver;
//! use gallery_content::{CallContext, ClientFactory, gallery};
//!
//! # async fn example(config: gallery_config::GalleryConfig) -> gallery_content::Result<()> {
//! let auth = Arc::new(AuthResolver::from_config(&config.auth)?);
//! let factory = ClientFactory::from_config(&config, auth)?;
//! let client = factory.get_client(CallContext::Server)?;
//!
//! let taxonomies = gallery::fetch_taxonomies(&client).await.unwrap_or_default();
//! let categories = gallery::fetch_all_categories(&client, &taxonomies, 4).await;
//! let previews = gallery::fetch_category_previews(&client, &categories, 4, 8).await;
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Taxonomies**: list, get, categories of a taxonomy
//! - **Items**: query, items of a category, get with renditions

pub mod api;
pub mod client;
pub mod error;
pub mod factory;
pub mod gallery;
pub mod types;

pub use api::{ItemQuery, ItemsApi, TaxonomiesApi, category_query};
pub use client::{ClientBuilder, ContentClient, ContentMode};
pub use error::{Error, Result};
pub use factory::{CallContext, ClientFactory};
pub use types::*;
