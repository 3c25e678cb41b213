//! Query-time errors.

use content::ContentError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The title is not in the title index. Distinct from a query that
    /// resolves but has no neighbours.
    #[error("Title not found: {title}")]
    NotFound { title: String },

    #[error(transparent)]
    Index(#[from] ContentError),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
