use std::sync::Arc;

use crate::services::RecommendationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<RecommendationService>,
    /// Upper bound accepted for the `limit` query parameter
    pub max_recommendation_limit: usize,
}

impl AppState {
    pub fn new(recommender: RecommendationService, max_recommendation_limit: usize) -> Self {
        Self {
            recommender: Arc::new(recommender),
            max_recommendation_limit,
        }
    }
}
