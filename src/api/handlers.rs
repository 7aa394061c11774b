use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::{CurrentUser, RequestId},
    models::{CorpusFilter, RecommendedFeed, VideoId},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub kind: CorpusFilter,
}

#[derive(Debug, Serialize)]
pub struct RecommendationIdsResponse {
    pub kind: CorpusFilter,
    pub video_ids: Vec<VideoId>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommended long-form videos and shorts for the current user.
///
/// Recommendations are best-effort: this handler only fails when the user
/// cannot be identified.
pub async fn recommended_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user_id): CurrentUser,
) -> Json<RecommendedFeed> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        "Building recommended feed"
    );

    let feed = state.recommender.recommended_feed(user_id).await;

    tracing::info!(
        request_id = %request_id,
        videos = feed.videos.len(),
        shorts = feed.shorts.len(),
        "Recommended feed ready"
    );

    Json(feed)
}

/// Ranked video ids for the current user, without hydration
pub async fn recommended_ids(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationIdsResponse>> {
    let limit = params
        .limit
        .unwrap_or(state.recommender.settings().videos_limit);

    if limit == 0 || limit > state.max_recommendation_limit {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            state.max_recommendation_limit
        )));
    }

    let video_ids = state
        .recommender
        .recommend(user_id, params.kind, limit)
        .await;

    Ok(Json(RecommendationIdsResponse {
        kind: params.kind,
        video_ids,
    }))
}
