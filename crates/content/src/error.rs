//! Error types for index construction and lookups.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Vectorization and similarity are undefined over zero items
    #[error("Cannot build a content index over an empty catalog")]
    EmptyCatalog,

    #[error("Row {row} is out of range for an index of {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ContentError>;
