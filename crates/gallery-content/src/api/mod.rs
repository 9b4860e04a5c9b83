//! API endpoint implementations.

mod items;
mod taxonomies;

pub use items::{ItemQuery, ItemsApi, category_query};
pub use taxonomies::TaxonomiesApi;

use std::borrow::Cow;

use crate::error::{Error, Result};

/// Percent-encode a resource ID for use as a single path segment.
fn path_segment(id: &str) -> Result<Cow<'_, str>> {
    match id {
        "" | "." | ".." => Err(Error::InvalidId(id.to_string())),
        _ => Ok(urlencoding::encode(id)),
    }
}
