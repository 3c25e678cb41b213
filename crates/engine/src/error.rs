//! Errors surfaced by the engine facade.
//!
//! Build errors (`Load`, `Content`, `Predictor`, `Config`) stop the engine
//! from being constructed. `Recommend` and `HybridDisabled` are query-time
//! and leave the engine usable.

use content::ContentError;
use data_loader::DataLoadError;
use pipeline::RecommendError;
use predictor::PredictorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to load input: {0}")]
    Load(#[from] DataLoadError),

    #[error("Failed to build content index: {0}")]
    Content(#[from] ContentError),

    #[error("Failed to train rating model: {0}")]
    Predictor(#[from] PredictorError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    /// Hybrid queries need an engine built with ratings
    #[error("Hybrid ranking is disabled: the engine was built without ratings")]
    HybridDisabled,

    #[error("Invalid configuration in {path}: {reason}")]
    Config { path: String, reason: String },
}

impl EngineError {
    /// True for an unknown query title
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Recommend(RecommendError::NotFound { .. }))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
