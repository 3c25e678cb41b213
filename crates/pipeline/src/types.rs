//! Ranked output handed to the presentation layer.

use data_loader::ItemId;

/// One content-similarity result
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Catalog row
    pub row: usize,
    pub item_id: ItemId,
    pub title: String,
    /// Cosine similarity to the query item, in `[0, 1]`
    pub score: f32,
}

/// One hybrid result: a content candidate re-scored for a user
#[derive(Debug, Clone, PartialEq)]
pub struct HybridRecommendation {
    pub row: usize,
    pub item_id: ItemId,
    pub title: String,
    pub predicted_rating: f32,
    /// Similarity that put the item on the shortlist
    pub similarity: f32,
    /// 0-based position in the content shortlist
    pub content_rank: usize,
}
