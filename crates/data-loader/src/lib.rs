//! # Data Loader Crate
//!
//! Loads the item catalog and the rating history the recommender is built
//! from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Item, Catalog, RatingTriple, RatingScale)
//! - **parser**: Parse MovieLens `.dat` files and headered `.csv` files
//! - **index**: Format detection, rating validation, parallel loading
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Catalog, DescriptorField, RatingScale};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/ml-1m/movies.dat"), DescriptorField::Genres)?;
//! let ratings = data_loader::load_ratings(Path::new("data/ml-1m/ratings.dat"), RatingScale::default())?;
//!
//! println!("{} items, {} ratings", catalog.len(), ratings.len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use index::{load_dataset, load_ratings, validate_ratings};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    Item,
    Catalog,
    DescriptorField,
    RatingTriple,
    RatingScale,
};
