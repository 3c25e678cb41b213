//! Trained latent-factor model and the prediction trait.

use data_loader::{ItemId, RatingScale, UserId};
use std::collections::HashMap;

/// Anything that can estimate how a user would rate an item.
///
/// `Send + Sync` so one trained model can serve concurrent queries.
pub trait RatingPredictor: Send + Sync {
    /// Estimated rating. Never fails: unknown users or items fall back to
    /// whatever bias information is available.
    fn predict(&self, user_id: UserId, item_id: ItemId) -> f32;
}

/// Biased matrix factorization model:
/// `r̂(u, i) = μ + b_u + b_i + p_u · q_i`
///
/// Immutable once training returns it.
#[derive(Debug, Clone)]
pub struct FactorModel {
    pub(crate) global_mean: f32,
    pub(crate) factors: usize,
    pub(crate) user_index: HashMap<UserId, usize>,
    pub(crate) item_index: HashMap<ItemId, usize>,
    pub(crate) user_bias: Vec<f32>,
    pub(crate) item_bias: Vec<f32>,
    /// Row-major `users x factors`
    pub(crate) user_factors: Vec<f32>,
    /// Row-major `items x factors`
    pub(crate) item_factors: Vec<f32>,
    /// Clamp predictions to this scale when set
    pub(crate) clip: Option<RatingScale>,
}

impl FactorModel {
    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn factors(&self) -> usize {
        self.factors
    }

    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_index.len()
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn knows_item(&self, item_id: ItemId) -> bool {
        self.item_index.contains_key(&item_id)
    }

    pub fn user_bias(&self, user_id: UserId) -> Option<f32> {
        self.user_index.get(&user_id).map(|&u| self.user_bias[u])
    }

    pub fn item_bias(&self, item_id: ItemId) -> Option<f32> {
        self.item_index.get(&item_id).map(|&i| self.item_bias[i])
    }

    pub(crate) fn user_vector(&self, u: usize) -> &[f32] {
        &self.user_factors[u * self.factors..(u + 1) * self.factors]
    }

    pub(crate) fn item_vector(&self, i: usize) -> &[f32] {
        &self.item_factors[i * self.factors..(i + 1) * self.factors]
    }

    /// Prediction from internal indices, before clipping
    pub(crate) fn raw_estimate(&self, user: Option<usize>, item: Option<usize>) -> f32 {
        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_bias[u];
        }
        if let Some(i) = item {
            estimate += self.item_bias[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            estimate += dot(self.user_vector(u), self.item_vector(i));
        }
        estimate
    }
}

impl RatingPredictor for FactorModel {
    fn predict(&self, user_id: UserId, item_id: ItemId) -> f32 {
        let user = self.user_index.get(&user_id).copied();
        let item = self.item_index.get(&item_id).copied();
        let estimate = self.raw_estimate(user, item);

        match self.clip {
            Some(scale) => scale.clamp(estimate),
            None => estimate,
        }
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two users, two items, one latent factor, hand-set weights
    fn hand_built(clip: Option<RatingScale>) -> FactorModel {
        FactorModel {
            global_mean: 3.0,
            factors: 1,
            user_index: [(10, 0), (20, 1)].into_iter().collect(),
            item_index: [(100, 0), (200, 1)].into_iter().collect(),
            user_bias: vec![0.5, -0.5],
            item_bias: vec![0.25, -0.25],
            user_factors: vec![2.0, -1.0],
            item_factors: vec![1.0, 0.5],
            clip,
        }
    }

    #[test]
    fn test_known_pair() {
        let model = hand_built(None);
        // 3.0 + 0.5 + 0.25 + 2.0 * 1.0
        assert_eq!(model.predict(10, 100), 5.75);
    }

    #[test]
    fn test_cold_start_fallbacks() {
        let model = hand_built(None);

        // Unseen user: mean + item bias
        assert_eq!(model.predict(99, 200), 2.75);
        // Unseen item: mean + user bias
        assert_eq!(model.predict(20, 999), 2.5);
        // Both unseen: global mean
        assert_eq!(model.predict(99, 999), 3.0);
        assert!(model.predict(99, 999).is_finite());
    }

    #[test]
    fn test_clip_only_when_configured() {
        assert!(hand_built(None).predict(10, 100) > 5.0);
        assert_eq!(hand_built(Some(RatingScale::default())).predict(10, 100), 5.0);
    }

    #[test]
    fn test_bias_accessors() {
        let model = hand_built(None);
        assert_eq!(model.user_bias(20), Some(-0.5));
        assert_eq!(model.item_bias(300), None);
        assert!(model.knows_user(10));
        assert!(!model.knows_item(300));
        assert_eq!(model.user_count(), 2);
    }
}
