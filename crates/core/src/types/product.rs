//! Product references stored in wishlists.

use serde::{Deserialize, Serialize};

use super::id::ProductRefId;

/// A denormalized display snapshot of a catalog item.
///
/// Only what a list view needs is kept. Nothing ties a reference back to the
/// live catalog, so a stored reference may go stale when the product changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReference {
    /// Identifier, unique within a collection.
    pub id: ProductRefId,
    /// Display name.
    pub name: String,
    /// Link to the product page.
    pub href: String,
    /// Formatted display price (e.g. "$129.00").
    pub price: String,
    /// Image URL.
    pub image_src: String,
    /// Image alt text.
    pub image_alt: String,
    /// Optional search/category tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
