//! Two-stage hybrid ranking: content shortlist, then personal re-rank.
//!
//! ## Algorithm
//! 1. Take the content shortlist: `recommend(title, n * shortlist_factor)`
//! 2. Predict the user's rating for every shortlisted item
//! 3. Sort by predicted rating descending, ties by content rank
//! 4. Keep the first `n`
//!
//! The rating model only ever sees the shortlist, never the full catalog.

use crate::error::Result;
use crate::recommender::Recommender;
use crate::types::{HybridRecommendation, Recommendation};
use data_loader::UserId;
use predictor::RatingPredictor;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct HybridRanker {
    recommender: Recommender,
    predictor: Arc<dyn RatingPredictor>,
    shortlist_factor: usize,
}

impl HybridRanker {
    pub fn new(recommender: Recommender, predictor: Arc<dyn RatingPredictor>) -> Self {
        Self {
            recommender,
            predictor,
            shortlist_factor: 1,
        }
    }

    /// Shortlist size as a multiple of `n` (default: 1, minimum 1)
    pub fn with_shortlist_factor(mut self, factor: usize) -> Self {
        self.shortlist_factor = factor.max(1);
        self
    }

    pub fn shortlist_factor(&self) -> usize {
        self.shortlist_factor
    }

    /// Content neighbours of `title` re-ordered by `user_id`'s predicted rating
    #[instrument(skip(self))]
    pub fn hybrid_recommend(
        &self,
        title: &str,
        user_id: UserId,
        n: usize,
    ) -> Result<Vec<HybridRecommendation>> {
        let shortlist = self
            .recommender
            .recommend(title, n.saturating_mul(self.shortlist_factor))?;
        debug!("Re-ranking {} shortlisted items for user {}", shortlist.len(), user_id);

        Ok(self.rerank(shortlist, user_id, n))
    }

    /// Score `shortlist` (in content order) for `user_id` and keep the best `n`
    pub fn rerank(
        &self,
        shortlist: Vec<Recommendation>,
        user_id: UserId,
        n: usize,
    ) -> Vec<HybridRecommendation> {
        let mut scored: Vec<HybridRecommendation> = shortlist
            .into_iter()
            .enumerate()
            .map(|(rank, rec)| HybridRecommendation {
                predicted_rating: self.predictor.predict(user_id, rec.item_id),
                row: rec.row,
                item_id: rec.item_id,
                title: rec.title,
                similarity: rec.score,
                content_rank: rank,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.predicted_rating
                .total_cmp(&a.predicted_rating)
                .then_with(|| a.content_rank.cmp(&b.content_rank))
        });
        scored.truncate(n);
        scored
    }
}
