//! Ranking pipeline over the content index.
//!
//! This crate provides:
//! - `Recommender`: title → top-N similar items
//! - `HybridRanker`: the content shortlist re-ordered by a rating predictor
//!
//! ## Architecture
//! Queries run in stages:
//! 1. The title is resolved to a catalog row
//! 2. The similarity index returns the row's nearest neighbours
//! 3. (Hybrid only) a `RatingPredictor` scores the shortlist for one user
//!    and the shortlist is re-sorted
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{HybridRanker, Recommender};
//!
//! let recommender = Recommender::new(catalog, titles, similarity);
//! let similar = recommender.recommend("Heat (1995)", 10)?;
//!
//! let hybrid = HybridRanker::new(recommender, model).with_shortlist_factor(3);
//! let personal = hybrid.hybrid_recommend("Heat (1995)", 42, 10)?;
//! ```

pub mod error;
pub mod types;
pub mod recommender;
pub mod hybrid;

// Re-export main types
pub use error::{RecommendError, Result};
pub use hybrid::HybridRanker;
pub use recommender::Recommender;
pub use types::{HybridRecommendation, Recommendation};
