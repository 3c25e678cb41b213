//! Core domain types for the catalog and the rating history.
//!
//! The catalog is an ordered, immutable table of items. An item's row
//! position is its stable index for every downstream structure (feature
//! vectors, similarity rows, title index), so rows always form the dense
//! range `[0, n)`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user in the rating history
pub type UserId = u32;

/// Identifier of a catalog item as it appears in the source files
pub type ItemId = u32;

// =============================================================================
// Item / Catalog
// =============================================================================

/// A single catalog entry.
///
/// `title` is not guaranteed to be unique. `descriptor` holds whatever text
/// the item is vectorized from: pipe-delimited genre tags or a free-text
/// overview. It may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub descriptor: String,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Which column of a tabular catalog feeds the item descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorField {
    /// `|`-delimited genre tags, e.g. `Action|Sci-Fi`
    #[default]
    Genres,
    /// Free-text synopsis
    Overview,
}

impl DescriptorField {
    /// Column name used in CSV headers
    pub fn column(&self) -> &'static str {
        match self {
            DescriptorField::Genres => "genres",
            DescriptorField::Overview => "overview",
        }
    }
}

/// Ordered, immutable sequence of items.
///
/// Built once at load time. Nothing mutates a catalog afterwards; a changed
/// item set means building a new catalog (and new indices on top of it).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    /// First row carrying each item id
    id_rows: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a catalog from items in row order
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut id_rows = HashMap::with_capacity(items.len());
        for (row, item) in items.iter().enumerate() {
            id_rows.entry(item.id).or_insert(row);
        }
        Self { items, id_rows }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item stored at `row`, if the row exists
    pub fn get(&self, row: usize) -> Option<&Item> {
        self.items.get(row)
    }

    /// All items in row order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Row of the first item carrying `id`
    pub fn row_of(&self, id: ItemId) -> Option<usize> {
        self.id_rows.get(&id).copied()
    }

    /// Descriptors in row order, ready for vectorization
    pub fn descriptors(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.descriptor.as_str()).collect()
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// One observed rating: `(user, item, rating)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingTriple {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f32,
}

impl RatingTriple {
    pub fn new(user_id: UserId, item_id: ItemId, rating: f32) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }
}

/// Closed interval of valid rating values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f32,
    pub max: f32,
}

impl RatingScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True when `rating` is finite and inside `[min, max]`
    pub fn contains(&self, rating: f32) -> bool {
        rating.is_finite() && rating >= self.min && rating <= self.max
    }

    pub fn clamp(&self, rating: f32) -> f32 {
        rating.clamp(self.min, self.max)
    }
}

impl Default for RatingScale {
    /// MovieLens half-star scale
    fn default() -> Self {
        Self { min: 0.5, max: 5.0 }
    }
}
