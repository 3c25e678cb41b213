//! # Content Crate
//!
//! Text-derived similarity over the item catalog.
//!
//! ## Components
//!
//! - **vectorizer**: TF-IDF vectors from item descriptors
//! - **similarity**: dense cosine matrix behind the `SimilaritySearch` trait
//! - **title_index**: exact title → row resolution (first occurrence wins)
//!
//! Everything here is built once from an immutable [`Catalog`] and is
//! read-only afterwards, so a [`ContentIndex`] can be shared across threads
//! behind an `Arc` without locking.
//!
//! ## Example Usage
//!
//! ```ignore
//! use content::{ContentIndex, SimilaritySearch};
//!
//! let index = ContentIndex::build(&catalog)?;
//! let row = index.titles.resolve("Toy Story (1995)").unwrap();
//! let neighbours = index.similarity.top_k_similar(row, 10)?;
//! ```

pub mod error;
pub mod stop_words;
pub mod vectorizer;
pub mod similarity;
pub mod title_index;

pub use error::{ContentError, Result};
pub use similarity::{SimilarityMatrix, SimilaritySearch};
pub use title_index::{DuplicateTitle, TitleIndex};
pub use vectorizer::{SparseVector, TfIdfVectorizer};

use data_loader::Catalog;
use std::time::Instant;
use tracing::{info, instrument};

/// Everything the content path needs, built in one pass over a catalog
#[derive(Debug, Clone)]
pub struct ContentIndex {
    pub vectorizer: TfIdfVectorizer,
    pub similarity: SimilarityMatrix,
    pub titles: TitleIndex,
}

impl ContentIndex {
    /// Vectorize descriptors, build the similarity matrix and the title index
    ///
    /// Fails with `EmptyCatalog` when `catalog` has no items.
    #[instrument(skip(catalog), fields(items = catalog.len()))]
    pub fn build(catalog: &Catalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(ContentError::EmptyCatalog);
        }

        let start = Instant::now();
        let (vectorizer, vectors) = TfIdfVectorizer::fit_transform(&catalog.descriptors())?;
        let zero = vectors.iter().filter(|v| v.is_zero()).count();
        info!(
            "Vectorized {} items (vocabulary {}, {} zero vectors)",
            vectors.len(),
            vectorizer.vocabulary_size(),
            zero
        );

        let similarity = SimilarityMatrix::build(&vectors)?;
        let titles = TitleIndex::build(catalog);

        info!("Content index ready in {:.2?}", start.elapsed());
        Ok(Self {
            vectorizer,
            similarity,
            titles,
        })
    }
}
