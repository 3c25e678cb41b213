//! Rating prediction for hybrid ranking.
//!
//! This crate trains a biased latent-factor model on `(user, item, rating)`
//! triples and serves predictions for any pair, falling back to bias terms
//! for users or items the model never saw.
//!
//! ## Example Usage
//!
//! ```ignore
//! use predictor::{MatrixFactorization, MfConfig, RatingPredictor};
//!
//! let (model, report) = MatrixFactorization::new(MfConfig::default()).fit(&ratings)?;
//! println!("validation RMSE: {:?}", report.validation_rmse);
//! let estimate = model.predict(42, 1193);
//! ```

pub mod error;
pub mod model;
pub mod split;
pub mod trainer;

pub use error::{PredictorError, Result};
pub use model::{FactorModel, RatingPredictor};
pub use split::train_validation_split;
pub use trainer::{rmse, MatrixFactorization, MfConfig, TrainingReport};
