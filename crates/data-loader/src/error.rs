//! Error types for the data-loader crate.
//!
//! Every failure while reading a catalog or a ratings file ends up here, so
//! callers can tell an unreadable file from a malformed line or an
//! out-of-scale rating.

use crate::types::{ItemId, UserId};
use thiserror::Error;

/// Errors that can occur during catalog and rating ingestion
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected a record (bad quoting, unequal row lengths, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A required column is absent from a CSV header
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// File extension is neither `.dat` nor `.csv`
    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    /// Rating value falls outside the configured scale
    #[error("Invalid rating {rating} for user {user_id} / item {item_id} (scale {min}..={max})")]
    InvalidRating {
        user_id: UserId,
        item_id: ItemId,
        rating: f32,
        min: f32,
        max: f32,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
