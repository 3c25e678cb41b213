//! Errors raised while training the rating model.
//!
//! Prediction itself never fails: unseen users and items fall back to the
//! bias terms.

use data_loader::{ItemId, UserId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("No ratings to train on")]
    NoRatings,

    #[error("Invalid rating {rating} for user {user_id} / item {item_id} (scale {min}..={max})")]
    InvalidRating {
        user_id: UserId,
        item_id: ItemId,
        rating: f32,
        min: f32,
        max: f32,
    },

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PredictorError>;
