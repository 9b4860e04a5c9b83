//! Items API.

use crate::client::ContentClient;
use crate::error::Result;
use crate::types::{Item, ItemList};

/// Query parameters for searching items.
#[derive(Debug, Default, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    /// Filter expression, e.g. `(type eq "DigitalAsset")`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Maximum number of items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Fields to include, e.g. `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Ask the service to report the total match count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<bool>,
}

/// Filter expression selecting the items in a category.
pub fn category_query(category_id: &str) -> String {
    format!("(taxonomies.categories.nodes.id eq \"{}\")", category_id)
}

/// Items API client.
pub struct ItemsApi {
    client: ContentClient,
}

impl ItemsApi {
    pub(crate) fn new(client: ContentClient) -> Self {
        Self { client }
    }

    /// Search items.
    pub async fn query(&self, query: &ItemQuery) -> Result<ItemList<Item>> {
        self.client.get_with_query("items", query).await
    }

    /// The first `limit` items of a category together with the total count.
    pub async fn in_category(&self, category_id: &str, limit: u32) -> Result<ItemList<Item>> {
        self.query(&ItemQuery {
            q: Some(category_query(category_id)),
            limit: Some(limit),
            fields: Some("all".to_string()),
            total_results: Some(true),
            ..Default::default()
        })
        .await
    }

    /// Get an item by ID with all fields (including renditions).
    pub async fn get(&self, id: &str) -> Result<Item> {
        self.client
            .get_with_query(
                &format!("items/{}", super::path_segment(id)?),
                &[("fields", "all")],
            )
            .await
    }
}
