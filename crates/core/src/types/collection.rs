//! Ordered, identifier-unique collections of product references.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductRefId;
use super::product::ProductReference;

/// A wishlist: product references in insertion order, no duplicate ids.
///
/// Serializes as a plain JSON array, which is also the stored format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductReference>", into = "Vec<ProductReference>")]
pub struct Collection {
    items: Vec<ProductReference>,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a collection from stored items, keeping the first occurrence of each id.
    #[must_use]
    pub fn from_items(items: Vec<ProductReference>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        Self { items }
    }

    /// Append `item` unless its id is already present.
    ///
    /// Returns `true` if the item was added.
    pub fn add(&mut self, item: ProductReference) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with `id`. Returns `true` if something was removed.
    pub fn remove(&mut self, id: &ProductRefId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Whether an item with `id` is present.
    #[must_use]
    pub fn contains(&self, id: &ProductRefId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductReference> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ProductReference] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<ProductReference> {
        self.items
    }
}

impl From<Vec<ProductReference>> for Collection {
    fn from(items: Vec<ProductReference>) -> Self {
        Self::from_items(items)
    }
}

impl From<Collection> for Vec<ProductReference> {
    fn from(collection: Collection) -> Self {
        collection.items
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a ProductReference;
    type IntoIter = std::slice::Iter<'a, ProductReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str) -> ProductReference {
        ProductReference {
            id: ProductRefId::parse(id).unwrap(),
            name: format!("Frame {id}"),
            href: format!("/products/{id}"),
            price: "$99.00".to_string(),
            image_src: format!("/img/{id}.jpg"),
            image_alt: format!("Frame {id}"),
            tags: vec!["frames".to_string()],
        }
    }

    fn ids(collection: &Collection) -> Vec<&str> {
        collection.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_add_skips_duplicate_ids() {
        let mut collection = Collection::new();
        assert!(collection.add(item("a")));
        assert!(collection.add(item("b")));

        let mut again = item("a");
        again.name = "Renamed".to_string();
        assert!(!collection.add(again));

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.as_slice().first().unwrap().name, "Frame a");
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut collection = Collection::from_items(vec![item("a"), item("b"), item("c")]);
        assert!(!collection.remove(&ProductRefId::parse("zzz").unwrap()));
        assert_eq!(ids(&collection), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut collection = Collection::from_items(vec![item("a"), item("b"), item("c")]);
        assert!(collection.remove(&ProductRefId::parse("b").unwrap()));
        assert_eq!(ids(&collection), vec!["a", "c"]);
    }

    #[test]
    fn test_from_items_keeps_first_occurrence() {
        let mut dup = item("a");
        dup.price = "$1.00".to_string();
        let collection = Collection::from_items(vec![item("a"), item("b"), dup]);

        assert_eq!(ids(&collection), vec!["a", "b"]);
        assert_eq!(collection.as_slice().first().unwrap().price, "$99.00");
    }

    #[test]
    fn test_serializes_as_array() {
        let collection = Collection::from_items(vec![item("a")]);
        let value = serde_json::to_value(&collection).unwrap();
        assert!(value.is_array());

        let back: Collection = serde_json::from_value(value).unwrap();
        assert_eq!(back, collection);
    }
}
