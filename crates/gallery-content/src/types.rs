//! Content service response types.

use serde::{Deserialize, Serialize};

/// A page of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ItemList<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub limit: u32,
    /// Only present when requested with `totalResults=true`.
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// A taxonomy (a tree of categories).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A category node within a taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A content item, typically an image asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: ItemFields,
}

/// Item fields. Renditions are typed, everything else is kept as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(default)]
    pub renditions: Vec<Rendition>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A named derived version of an asset, e.g. `thumbnail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendition {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub formats: Vec<RenditionFormat>,
}

/// One encoding of a rendition, e.g. `jpg` or `webp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenditionFormat {
    pub format: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl Item {
    /// Find a rendition by name, ignoring case.
    pub fn rendition(&self, name: &str) -> Option<&Rendition> {
        self.fields
            .renditions
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// URL of a rendition in the given format.
    ///
    /// Prefers the `self` link and falls back to the first link.
    pub fn rendition_url(&self, name: &str, format: &str) -> Option<&str> {
        let format = self
            .rendition(name)?
            .formats
            .iter()
            .find(|f| f.format.eq_ignore_ascii_case(format))?;

        format
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("self"))
            .or_else(|| format.links.first())
            .map(|l| l.href.as_str())
    }
}

/// A preview of the items in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItems {
    pub category_id: String,
    /// Total number of items in the category.
    pub total_results: u64,
    /// The first few items.
    pub items: Vec<Item>,
}
