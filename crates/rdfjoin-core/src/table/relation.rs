//! Single-property relation.

use crate::model::Item;

/// The facts of one property, in load order.
///
/// Append-only during load; the owning [`Database`](super::Database)
/// carries the dictionaries needed to decode string-typed objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relation {
    property: String,
    items: Vec<Item>,
}

impl Relation {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            items: Vec::new(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    /// Append an item. Never invalidates prior positions.
    pub fn insert(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
