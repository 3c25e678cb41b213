//! Pairwise cosine similarity over TF-IDF vectors.
//!
//! The dense `n x n` matrix costs `O(n^2 * d)` time and `O(n^2)` memory,
//! which is fine up to tens of thousands of items. Callers only ever go
//! through [`SimilaritySearch`], so a sub-linear neighbour index can replace
//! the matrix without touching the recommender.

use crate::error::{ContentError, Result};
use crate::vectorizer::SparseVector;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{info, instrument};

/// Query contract every similarity structure has to honour
pub trait SimilaritySearch: Send + Sync {
    /// Number of rows in the index
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity between rows `a` and `b`, `None` when either is out of range
    fn similarity(&self, a: usize, b: usize) -> Option<f32>;

    /// Up to `k` neighbours of `row` as `(row, score)` pairs.
    ///
    /// `row` itself is never returned. Pairs come sorted by score
    /// descending, ties broken by ascending row index.
    fn top_k_similar(&self, row: usize, k: usize) -> Result<Vec<(usize, f32)>>;
}

/// Ranking order for neighbour lists: score descending, then row ascending
pub fn neighbour_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Dense, row-major, symmetric cosine similarity matrix
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Compute every pairwise similarity, rows in parallel.
    ///
    /// Vectors are expected to be L2-normalized (as produced by the
    /// vectorizer), so cosine similarity is a plain dot product. The
    /// diagonal is 1 for non-zero vectors and 0 for the zero vector, where
    /// cosine similarity is undefined.
    #[instrument(skip(vectors), fields(rows = vectors.len()))]
    pub fn build(vectors: &[SparseVector]) -> Result<Self> {
        let n = vectors.len();
        if n == 0 {
            return Err(ContentError::EmptyCatalog);
        }

        let start = Instant::now();
        let mut data = vec![0.0f32; n * n];

        data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            let vi = &vectors[i];
            if vi.is_zero() {
                // Zero vector: every entry, diagonal included, stays 0
                return;
            }
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if i == j {
                    1.0
                } else {
                    vi.dot(&vectors[j]).clamp(0.0, 1.0)
                };
            }
        });

        info!("Built {}x{} similarity matrix in {:.2?}", n, n, start.elapsed());
        Ok(Self { n, data })
    }

    /// Full similarity row for `row`
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row < self.n {
            Some(&self.data[row * self.n..(row + 1) * self.n])
        } else {
            None
        }
    }
}

impl SimilaritySearch for SimilarityMatrix {
    fn len(&self) -> usize {
        self.n
    }

    fn similarity(&self, a: usize, b: usize) -> Option<f32> {
        if a < self.n && b < self.n {
            Some(self.data[a * self.n + b])
        } else {
            None
        }
    }

    fn top_k_similar(&self, row: usize, k: usize) -> Result<Vec<(usize, f32)>> {
        let scores = self.row(row).ok_or(ContentError::RowOutOfRange {
            row,
            len: self.n,
        })?;

        let mut pairs: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != row)
            .collect();

        // Partition the k best to the front before the final sort
        if k < pairs.len() {
            pairs.select_nth_unstable_by(k, neighbour_order);
            pairs.truncate(k);
        }
        pairs.sort_by(neighbour_order);

        Ok(pairs)
    }
}
