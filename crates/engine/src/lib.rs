//! Recommendation engine facade.
//!
//! Ties the workspace together: loads a catalog (and optional ratings),
//! builds the content index and rating model, and serves content and
//! hybrid queries from one shareable value.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, RecommendationEngine};
//!
//! let engine = RecommendationEngine::load_from_files(
//!     Path::new("data/ml-1m/movies.dat"),
//!     Some(Path::new("data/ml-1m/ratings.dat")),
//!     EngineConfig::default(),
//! )?;
//!
//! for rec in engine.recommend("Toy Story (1995)", 10)? {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! let personal = engine.hybrid_recommend("Toy Story (1995)", 42, 10)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{EngineBuilder, RecommendationEngine};
pub use error::{EngineError, Result};

pub use pipeline::{HybridRecommendation, Recommendation};
