//! Stochastic gradient descent trainer for [`FactorModel`].
//!
//! ## Algorithm
//! For every observed rating in the (shuffled) training partition:
//! ```text
//! e   = r - (μ + b_u + b_i + p_u · q_i)
//! b_u += γ (e - λ b_u)
//! b_i += γ (e - λ b_i)
//! p_u += γ (e q_i - λ p_u)
//! q_i += γ (e p_u - λ q_i)
//! ```
//! repeated for a fixed number of epochs. Users and items only seen in the
//! validation partition stay unknown to the model and are predicted through
//! the bias fallback.

use crate::error::{PredictorError, Result};
use crate::model::{FactorModel, RatingPredictor};
use crate::split::train_validation_split;
use data_loader::{RatingScale, RatingTriple};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Hyper-parameters for matrix factorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfConfig {
    /// Latent dimensions per user / item
    pub factors: usize,
    pub epochs: usize,
    /// SGD step size (γ)
    pub learning_rate: f32,
    /// L2 penalty (λ)
    pub regularization: f32,
    /// Factors start uniform in `[-init_spread, init_spread]`
    pub init_spread: f32,
    /// Share of ratings held out for validation
    pub validation_fraction: f32,
    /// Seed for the split, initialization and epoch shuffles
    pub seed: u64,
    /// Clamp predictions to the rating scale
    pub clip_predictions: bool,
}

impl Default for MfConfig {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_spread: 0.1,
            validation_fraction: 0.2,
            seed: 42,
            clip_predictions: false,
        }
    }
}

impl MfConfig {
    fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(PredictorError::InvalidConfig("epochs must be > 0".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(PredictorError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.regularization >= 0.0 && self.regularization.is_finite()) {
            return Err(PredictorError::InvalidConfig(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            )));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(PredictorError::InvalidConfig(format!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        if !(self.init_spread >= 0.0 && self.init_spread.is_finite()) {
            return Err(PredictorError::InvalidConfig(format!(
                "init_spread must be non-negative, got {}",
                self.init_spread
            )));
        }
        Ok(())
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub validation_size: usize,
    pub users: usize,
    pub items: usize,
    pub epochs: usize,
    pub train_rmse: f32,
    /// `None` when nothing was held out
    pub validation_rmse: Option<f32>,
}

/// Trainer for [`FactorModel`]
#[derive(Debug, Clone, Default)]
pub struct MatrixFactorization {
    config: MfConfig,
    scale: RatingScale,
}

impl MatrixFactorization {
    pub fn new(config: MfConfig) -> Self {
        Self {
            config,
            scale: RatingScale::default(),
        }
    }

    /// Rating scale every training triple must fall in (default 0.5..=5.0)
    pub fn with_scale(mut self, scale: RatingScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn config(&self) -> &MfConfig {
        &self.config
    }

    /// Split, train and evaluate
    #[instrument(skip(self, ratings), fields(ratings = ratings.len()))]
    pub fn fit(&self, ratings: &[RatingTriple]) -> Result<(FactorModel, TrainingReport)> {
        self.config.validate()?;
        if ratings.is_empty() {
            return Err(PredictorError::NoRatings);
        }
        if let Some(bad) = ratings.iter().find(|r| !self.scale.contains(r.rating)) {
            return Err(PredictorError::InvalidRating {
                user_id: bad.user_id,
                item_id: bad.item_id,
                rating: bad.rating,
                min: self.scale.min,
                max: self.scale.max,
            });
        }

        let start = Instant::now();
        let (train, validation) =
            train_validation_split(ratings, self.config.validation_fraction, self.config.seed);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut model = self.initialize(&train, &mut rng);

        // Internal indices for every training triple
        let observed: Vec<(usize, usize, f32)> = train
            .iter()
            .map(|r| (model.user_index[&r.user_id], model.item_index[&r.item_id], r.rating))
            .collect();

        let mut order: Vec<usize> = (0..observed.len()).collect();
        let mut train_rmse = f32::NAN;
        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            for &idx in &order {
                let (u, i, r) = observed[idx];
                self.sgd_step(&mut model, u, i, r);
            }
            train_rmse = observed_rmse(&model, &observed);
            debug!("Epoch {}/{}: train RMSE {:.4}", epoch + 1, self.config.epochs, train_rmse);
        }

        model.clip = self.config.clip_predictions.then_some(self.scale);

        let validation_rmse = (!validation.is_empty()).then(|| rmse(&model, &validation));
        let report = TrainingReport {
            train_size: train.len(),
            validation_size: validation.len(),
            users: model.user_count(),
            items: model.item_count(),
            epochs: self.config.epochs,
            train_rmse,
            validation_rmse,
        };

        info!(
            "Trained {}-factor model on {} ratings in {:.2?} (train RMSE {:.4}, validation RMSE {})",
            self.config.factors,
            report.train_size,
            start.elapsed(),
            report.train_rmse,
            report
                .validation_rmse
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok((model, report))
    }

    /// Index users and items seen in training and draw initial factors
    fn initialize(&self, train: &[RatingTriple], rng: &mut StdRng) -> FactorModel {
        let mut user_index = HashMap::new();
        let mut item_index = HashMap::new();
        for r in train {
            let next = user_index.len();
            user_index.entry(r.user_id).or_insert(next);
            let next = item_index.len();
            item_index.entry(r.item_id).or_insert(next);
        }

        let global_mean =
            (train.iter().map(|r| r.rating as f64).sum::<f64>() / train.len() as f64) as f32;

        let k = self.config.factors;
        let spread = self.config.init_spread;
        let mut draw = |len: usize| -> Vec<f32> {
            (0..len)
                .map(|_| if spread > 0.0 { rng.random_range(-spread..spread) } else { 0.0 })
                .collect()
        };
        let user_factors = draw(user_index.len() * k);
        let item_factors = draw(item_index.len() * k);

        FactorModel {
            global_mean,
            factors: k,
            user_bias: vec![0.0; user_index.len()],
            item_bias: vec![0.0; item_index.len()],
            user_index,
            item_index,
            user_factors,
            item_factors,
            clip: None,
        }
    }

    fn sgd_step(&self, model: &mut FactorModel, u: usize, i: usize, rating: f32) {
        let lr = self.config.learning_rate;
        let reg = self.config.regularization;
        let k = model.factors;

        let error = rating - model.raw_estimate(Some(u), Some(i));

        model.user_bias[u] += lr * (error - reg * model.user_bias[u]);
        model.item_bias[i] += lr * (error - reg * model.item_bias[i]);

        for f in 0..k {
            let pu = model.user_factors[u * k + f];
            let qi = model.item_factors[i * k + f];
            model.user_factors[u * k + f] += lr * (error * qi - reg * pu);
            model.item_factors[i * k + f] += lr * (error * pu - reg * qi);
        }
    }
}

fn observed_rmse(model: &FactorModel, observed: &[(usize, usize, f32)]) -> f32 {
    let sum: f64 = observed
        .par_iter()
        .map(|&(u, i, r)| {
            let e = (r - model.raw_estimate(Some(u), Some(i))) as f64;
            e * e
        })
        .sum();
    (sum / observed.len() as f64).sqrt() as f32
}

/// Root mean squared error of `predictor` over `ratings` (NaN when empty)
pub fn rmse<P: RatingPredictor + ?Sized>(predictor: &P, ratings: &[RatingTriple]) -> f32 {
    if ratings.is_empty() {
        return f32::NAN;
    }
    let sum: f64 = ratings
        .par_iter()
        .map(|r| {
            let e = (r.rating - predictor.predict(r.user_id, r.item_id)) as f64;
            e * e
        })
        .sum();
    (sum / ratings.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Users 1-2 love items 1-2 and hate 3-4, users 3-4 the opposite.
    /// Every user and item averages 3.0, so biases alone explain nothing.
    fn taste_groups() -> Vec<RatingTriple> {
        let mut ratings = Vec::new();
        for user in 1..=4u32 {
            for item in 1..=4u32 {
                let likes = (user <= 2) == (item <= 2);
                ratings.push(RatingTriple::new(user, item, if likes { 5.0 } else { 1.0 }));
            }
        }
        ratings
    }

    fn toy_config() -> MfConfig {
        MfConfig {
            factors: 4,
            epochs: 500,
            learning_rate: 0.05,
            regularization: 0.01,
            validation_fraction: 0.0,
            ..MfConfig::default()
        }
    }

    #[test]
    fn test_fit_learns_taste_groups() {
        let ratings = taste_groups();
        let (model, report) = MatrixFactorization::new(toy_config()).fit(&ratings).unwrap();

        // Global-mean baseline RMSE is exactly 2.0 on this data
        assert!(report.train_rmse < 1.5, "train RMSE {}", report.train_rmse);
        assert!(model.predict(1, 1) > model.predict(1, 3));
        assert!(model.predict(3, 4) > model.predict(3, 2));
        assert_eq!(report.train_size, 16);
        assert_eq!(report.validation_rmse, None);
        assert!((model.global_mean() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_model() {
        let ratings = taste_groups();
        let trainer = MatrixFactorization::new(MfConfig { epochs: 10, ..toy_config() });
        let (a, _) = trainer.fit(&ratings).unwrap();
        let (b, _) = trainer.fit(&ratings).unwrap();

        for user in 1..=4 {
            for item in 1..=4 {
                assert_eq!(a.predict(user, item), b.predict(user, item));
            }
        }
    }

    #[test]
    fn test_validation_partition_reported() {
        let ratings = taste_groups();
        let config = MfConfig { validation_fraction: 0.25, epochs: 5, ..toy_config() };
        let (_, report) = MatrixFactorization::new(config).fit(&ratings).unwrap();

        assert_eq!(report.train_size, 12);
        assert_eq!(report.validation_size, 4);
        assert!(report.validation_rmse.unwrap().is_finite());
    }

    #[test]
    fn test_cold_start_user_uses_bias() {
        let ratings = taste_groups();
        let (model, _) = MatrixFactorization::new(toy_config()).fit(&ratings).unwrap();

        let prediction = model.predict(999, 1);
        assert!(prediction.is_finite());
        let expected = model.global_mean() + model.item_bias(1).unwrap();
        assert!((prediction - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_out_of_scale_rating() {
        let ratings = vec![RatingTriple::new(1, 1, 4.0), RatingTriple::new(1, 2, 6.0)];
        let err = MatrixFactorization::default().fit(&ratings).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidRating { item_id: 2, .. }));

        // Same value is fine on a 1..=10 scale
        let ok = MatrixFactorization::new(MfConfig { factors: 2, epochs: 1, ..MfConfig::default() })
            .with_scale(RatingScale::new(1.0, 10.0))
            .fit(&ratings);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_no_ratings() {
        assert_eq!(
            MatrixFactorization::default().fit(&[]).unwrap_err(),
            PredictorError::NoRatings
        );
    }

    #[test]
    fn test_invalid_config() {
        let trainer = MatrixFactorization::new(MfConfig { epochs: 0, ..MfConfig::default() });
        assert!(matches!(
            trainer.fit(&taste_groups()),
            Err(PredictorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_clip_predictions() {
        let ratings = taste_groups();
        let config = MfConfig { clip_predictions: true, ..toy_config() };
        let (model, _) = MatrixFactorization::new(config).fit(&ratings).unwrap();

        for user in 1..=4 {
            for item in 1..=4 {
                let p = model.predict(user, item);
                assert!((0.5..=5.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: MfConfig = serde_json::from_str(r#"{"factors": 8}"#).unwrap();
        assert_eq!(config.factors, 8);
        assert_eq!(config.epochs, MfConfig::default().epochs);
    }

    #[test]
    fn test_rmse_helper() {
        let (model, _) = MatrixFactorization::new(toy_config()).fit(&taste_groups()).unwrap();
        assert!(rmse(&model, &[]).is_nan());
        assert!(rmse(&model, &taste_groups()) >= 0.0);
    }
}
