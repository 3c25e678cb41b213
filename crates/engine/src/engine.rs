//! # Recommendation Engine
//!
//! The build step turns a catalog (and optionally a rating history) into
//! one immutable value:
//! 1. Vectorize descriptors and build the similarity matrix + title index
//! 2. Train the rating model, in parallel with step 1, when ratings exist
//! 3. Wire the recommender and the hybrid ranker on top
//!
//! Nothing in a built [`RecommendationEngine`] is mutated again. Every
//! component sits behind an `Arc`, so clones are cheap and any number of
//! threads can query the same engine without locks. A changed catalog
//! means building a new engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use content::{ContentIndex, SimilarityMatrix, SimilaritySearch};
use data_loader::{Catalog, ItemId, RatingTriple, UserId};
use pipeline::{HybridRanker, HybridRecommendation, Recommendation, Recommender};
use predictor::{FactorModel, MatrixFactorization, RatingPredictor, TrainingReport};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Collects build inputs for a [`RecommendationEngine`]
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    catalog: Catalog,
    ratings: Option<Vec<RatingTriple>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            catalog: Catalog::default(),
            ratings: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Enable hybrid mode by training on `ratings`
    pub fn with_ratings(mut self, ratings: Vec<RatingTriple>) -> Self {
        self.ratings = Some(ratings);
        self
    }

    /// Run the full build.
    ///
    /// Fails with `Content(EmptyCatalog)` when no items were supplied and
    /// with `Predictor(..)` when the ratings cannot be trained on.
    #[instrument(skip(self), fields(items = self.catalog.len()))]
    pub fn build(self) -> Result<RecommendationEngine> {
        let start = Instant::now();
        let EngineBuilder {
            config,
            catalog,
            ratings,
        } = self;

        let trainer = MatrixFactorization::new(config.model.clone()).with_scale(config.rating_scale);

        let (content, trained) = rayon::join(
            || ContentIndex::build(&catalog),
            || ratings.as_deref().map(|r| trainer.fit(r)).transpose(),
        );
        let content = content?;
        let trained = trained?;

        let catalog = Arc::new(catalog);
        let similarity = Arc::new(content.similarity);
        let recommender = Recommender::new(
            Arc::clone(&catalog),
            Arc::new(content.titles),
            similarity.clone(),
        );

        let (model, report) = match trained {
            Some((model, report)) => (Some(Arc::new(model)), Some(report)),
            None => (None, None),
        };

        let hybrid = model.as_ref().map(|model| {
            HybridRanker::new(recommender.clone(), model.clone())
                .with_shortlist_factor(config.shortlist_factor)
        });

        info!(
            "Engine built in {:.2?} ({} items, hybrid: {})",
            start.elapsed(),
            catalog.len(),
            hybrid.is_some()
        );

        Ok(RecommendationEngine {
            config: Arc::new(config),
            catalog,
            similarity,
            recommender,
            hybrid,
            model,
            report,
        })
    }
}

/// Immutable, shareable build artifact serving all queries
#[derive(Clone)]
pub struct RecommendationEngine {
    config: Arc<EngineConfig>,
    catalog: Arc<Catalog>,
    similarity: Arc<SimilarityMatrix>,
    recommender: Recommender,
    hybrid: Option<HybridRanker>,
    model: Option<Arc<FactorModel>>,
    report: Option<TrainingReport>,
}

impl RecommendationEngine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Load the catalog (and ratings, when given) from disk and build
    pub fn load_from_files(
        catalog_path: &Path,
        ratings_path: Option<&Path>,
        config: EngineConfig,
    ) -> Result<Self> {
        info!("Loading catalog from {:?}", catalog_path);
        let (catalog, ratings) = data_loader::load_dataset(
            catalog_path,
            ratings_path,
            config.descriptor,
            config.rating_scale,
        )?;

        let mut builder = EngineBuilder::new(config).with_catalog(catalog);
        if let Some(ratings) = ratings {
            builder = builder.with_ratings(ratings);
        }
        builder.build()
    }

    /// Up to `n` items most similar to `title`
    pub fn recommend(&self, title: &str, n: usize) -> Result<Vec<Recommendation>> {
        Ok(self.recommender.recommend(title, n)?)
    }

    /// `recommend` with the configured default count
    pub fn recommend_default(&self, title: &str) -> Result<Vec<Recommendation>> {
        self.recommend(title, self.config.default_limit)
    }

    /// Content neighbours of `title` re-ranked by `user_id`'s predicted rating
    pub fn hybrid_recommend(
        &self,
        title: &str,
        user_id: UserId,
        n: usize,
    ) -> Result<Vec<HybridRecommendation>> {
        let hybrid = self.hybrid.as_ref().ok_or(EngineError::HybridDisabled)?;
        Ok(hybrid.hybrid_recommend(title, user_id, n)?)
    }

    /// Predicted rating for any `(user, item)` pair
    pub fn predict(&self, user_id: UserId, item_id: ItemId) -> Result<f32> {
        let model = self.model.as_ref().ok_or(EngineError::HybridDisabled)?;
        Ok(model.predict(user_id, item_id))
    }

    pub fn is_hybrid(&self) -> bool {
        self.hybrid.is_some()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &dyn SimilaritySearch {
        self.similarity.as_ref()
    }

    pub fn training_report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
