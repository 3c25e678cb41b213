//! Content-based top-N retrieval.
//!
//! ## Algorithm
//! 1. Resolve the title to a catalog row (`NotFound` if unknown)
//! 2. Ask the similarity index for the row's `n` best neighbours
//!    (score descending, ties by ascending row, query row excluded)
//! 3. Attach item id and title to each neighbour
//!
//! All state is shared read-only through `Arc`, so cloning a `Recommender`
//! is cheap and clones can serve queries from any thread.

use crate::error::{RecommendError, Result};
use crate::types::Recommendation;
use content::{SimilaritySearch, TitleIndex};
use data_loader::Catalog;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    titles: Arc<TitleIndex>,
    index: Arc<dyn SimilaritySearch>,
}

impl Recommender {
    pub fn new(
        catalog: Arc<Catalog>,
        titles: Arc<TitleIndex>,
        index: Arc<dyn SimilaritySearch>,
    ) -> Self {
        Self {
            catalog,
            titles,
            index,
        }
    }

    /// Row of `title`, or `NotFound`
    pub fn resolve(&self, title: &str) -> Result<usize> {
        self.titles
            .resolve(title)
            .ok_or_else(|| RecommendError::NotFound {
                title: title.to_string(),
            })
    }

    /// Up to `n` items most similar to `title`, best first.
    ///
    /// Returns `min(n, catalog size - 1)` entries; never the query itself.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, n: usize) -> Result<Vec<Recommendation>> {
        let row = self.resolve(title)?;
        let neighbours = self.index.top_k_similar(row, n)?;

        let recommendations: Vec<Recommendation> = neighbours
            .into_iter()
            .filter_map(|(neighbour, score)| {
                let item = self.catalog.get(neighbour)?;
                Some(Recommendation {
                    row: neighbour,
                    item_id: item.id,
                    title: item.title.clone(),
                    score,
                })
            })
            .collect();

        debug!("{} neighbours for row {}", recommendations.len(), row);
        Ok(recommendations)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
