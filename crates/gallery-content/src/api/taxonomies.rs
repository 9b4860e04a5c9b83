//! Taxonomies API.

use crate::client::ContentClient;
use crate::error::Result;
use crate::types::{Category, ItemList, Taxonomy};

/// Taxonomies API client.
pub struct TaxonomiesApi {
    client: ContentClient,
}

impl TaxonomiesApi {
    pub(crate) fn new(client: ContentClient) -> Self {
        Self { client }
    }

    /// List the taxonomies published to the channel.
    pub async fn list(&self) -> Result<ItemList<Taxonomy>> {
        self.client.get("taxonomies").await
    }

    /// Get a taxonomy by ID.
    pub async fn get(&self, id: &str) -> Result<Taxonomy> {
        self.client
            .get(&format!("taxonomies/{}", super::path_segment(id)?))
            .await
    }

    /// List the categories of a taxonomy.
    pub async fn categories(&self, taxonomy_id: &str) -> Result<ItemList<Category>> {
        self.client
            .get_with_query(
                &format!("taxonomies/{}/categories", super::path_segment(taxonomy_id)?),
                &[("orderBy", "position:asc")],
            )
            .await
    }
}
