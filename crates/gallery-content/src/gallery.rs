//! Data fetching for gallery pages.
//!
//! These helpers never fail: upstream errors are logged and turn into `None`,
//! and pages render whatever arrived.

use futures::StreamExt;

use crate::client::ContentClient;
use crate::types::{Category, CategoryItems, Item, Taxonomy};

/// Number of items shown per category on the overview page.
pub const PREVIEW_ITEMS_PER_CATEGORY: u32 = 4;

/// Default number of in-flight requests for fan-out helpers.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// All taxonomies of the channel.
pub async fn fetch_taxonomies(client: &ContentClient) -> Option<Vec<Taxonomy>> {
    match client.taxonomies().list().await {
        Ok(list) => Some(list.items),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch taxonomies");
            None
        }
    }
}

/// Categories of one taxonomy.
pub async fn fetch_categories(client: &ContentClient, taxonomy_id: &str) -> Option<Vec<Category>> {
    match client.taxonomies().categories(taxonomy_id).await {
        Ok(list) => Some(list.items),
        Err(e) => {
            tracing::warn!(taxonomy_id, error = %e, "Failed to fetch categories");
            None
        }
    }
}

/// The first `limit` items of a category and its total item count.
pub async fn fetch_items_for_category(
    client: &ContentClient,
    category_id: &str,
    limit: u32,
) -> Option<CategoryItems> {
    match client.items().in_category(category_id, limit).await {
        Ok(list) => Some(CategoryItems {
            category_id: category_id.to_string(),
            total_results: list.total_results.unwrap_or(list.items.len() as u64),
            items: list.items,
        }),
        Err(e) => {
            tracing::warn!(category_id, error = %e, "Failed to fetch category items");
            None
        }
    }
}

/// A single item with its renditions.
pub async fn fetch_item(client: &ContentClient, id: &str) -> Option<Item> {
    match client.items().get(id).await {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::warn!(item_id = id, error = %e, "Failed to fetch item");
            None
        }
    }
}

/// Item previews for many categories.
///
/// At most `concurrency` requests are in flight. The result has one entry per
/// input category, in input order, whatever order the responses arrive in.
pub async fn fetch_category_previews(
    client: &ContentClient,
    categories: &[Category],
    limit: u32,
    concurrency: usize,
) -> Vec<Option<CategoryItems>> {
    futures::stream::iter(
        categories
            .iter()
            .map(|category| fetch_items_for_category(client, &category.id, limit)),
    )
    .buffered(concurrency.max(1))
    .collect()
    .await
}

/// Categories of all taxonomies, flattened in taxonomy order.
///
/// Taxonomies whose categories fail to load are skipped.
pub async fn fetch_all_categories(
    client: &ContentClient,
    taxonomies: &[Taxonomy],
    concurrency: usize,
) -> Vec<Category> {
    let per_taxonomy: Vec<Option<Vec<Category>>> = futures::stream::iter(
        taxonomies
            .iter()
            .map(|taxonomy| fetch_categories(client, &taxonomy.id)),
    )
    .buffered(concurrency.max(1))
    .collect()
    .await;

    per_taxonomy.into_iter().flatten().flatten().collect()
}
