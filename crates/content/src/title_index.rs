//! Exact title → row resolution.
//!
//! ## Collision policy
//! Titles are not unique in real catalogs (remakes, re-releases). When
//! several rows share a title, the **first** row in catalog order is the one
//! the title resolves to; later rows stay in the catalog and in the
//! similarity index but cannot be queried by title. Every dropped row is
//! recorded in [`TitleIndex::duplicates`] and the total is logged at `warn`.
//!
//! Lookups are case-sensitive and match the title exactly as ingested.

use data_loader::Catalog;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// A title that appeared more than once in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTitle {
    pub title: String,
    /// Row the title resolves to
    pub kept_row: usize,
    /// Row that lost the collision
    pub dropped_row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    rows: HashMap<String, usize>,
    duplicates: Vec<DuplicateTitle>,
}

impl TitleIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut rows = HashMap::with_capacity(catalog.len());
        let mut duplicates = Vec::new();

        for (row, item) in catalog.iter().enumerate() {
            match rows.entry(item.title.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(slot) => duplicates.push(DuplicateTitle {
                    title: item.title.clone(),
                    kept_row: *slot.get(),
                    dropped_row: row,
                }),
            }
        }

        if !duplicates.is_empty() {
            warn!(
                "{} duplicate titles; each resolves to its first catalog row",
                duplicates.len()
            );
        }

        Self { rows, duplicates }
    }

    /// Row for `title`, `None` when the title is unknown
    pub fn resolve(&self, title: &str) -> Option<usize> {
        self.rows.get(title).copied()
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn duplicates(&self) -> &[DuplicateTitle] {
        &self.duplicates
    }
}
