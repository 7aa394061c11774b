use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::{
    cached,
    db::{Cache, CacheKey},
    engine::{
        build_corpus, has_watch_signal, rank_cold_start, rank_warm_start, top_ids, RankingMode,
        TfidfVectorizer,
    },
    error::{AppError, AppResult},
    models::{CorpusFilter, RecommendedFeed, VideoDocument, VideoId, VideoSummary},
    services::catalog::VideoCatalog,
};

/// Tuning for the recommendation service
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    /// Long-form videos in the recommended feed
    pub videos_limit: usize,
    /// Shorts in the recommended feed
    pub shorts_limit: usize,
    /// Budget for fetching and ranking; slower work is abandoned
    pub timeout: Duration,
    /// TTL of cached fitted models in seconds
    pub model_cache_ttl: u64,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            videos_limit: 20,
            shorts_limit: 10,
            timeout: Duration::from_millis(2000),
            model_cache_ttl: 600,
        }
    }
}

/// Fingerprint of the exact snapshot a model is fitted on
///
/// The hash covers each video's id, `updated_at` and the exact text the
/// model is fitted on, so an edit changes the key even when the writer did
/// not bump `updated_at`. Inserts, deletes and soft-deletes change the count
/// or the hash.
pub fn corpus_fingerprint(videos: &[VideoDocument]) -> String {
    let mut hasher = DefaultHasher::new();
    for video in videos {
        video.id.hash(&mut hasher);
        video.updated_at.timestamp_micros().hash(&mut hasher);
        video.corpus_text().hash(&mut hasher);
    }
    let latest = videos
        .iter()
        .map(|video| video.updated_at.timestamp_micros())
        .max()
        .unwrap_or_default();

    format!("{}-{}-{:016x}", videos.len(), latest, hasher.finish())
}

/// Content-based recommendations over the live catalog
///
/// Every call fetches a fresh snapshot and ranks it from scratch. Failures
/// never reach the caller: a ranking that errors or runs out of time is
/// logged and replaced by an empty result.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn VideoCatalog>,
    cache: Option<Cache>,
    settings: RecommenderSettings,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        cache: Option<Cache>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            catalog,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    /// Ranked video ids for `user_id`, most relevant first, at most `limit`.
    ///
    /// Returns an empty list when the catalog is empty or anything fails.
    pub async fn recommend(&self, user_id: Uuid, filter: CorpusFilter, limit: usize) -> Vec<VideoId> {
        let result = self
            .within_budget(async {
                let (videos, watched) = self.fetch_snapshot(user_id).await?;
                self.rank_snapshot(filter, filter.apply(&videos), Arc::new(watched), limit)
                    .await
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::error!(
                user_id = %user_id,
                filter = %filter,
                error = %e,
                "Recommendation engine error, returning no recommendations"
            );
            Vec::new()
        })
    }

    /// Long-form and shorts recommendations, hydrated for display.
    ///
    /// The snapshot is fetched once and ranked separately per partition. A
    /// partition whose ranking is empty falls back to its most viewed videos.
    pub async fn recommended_feed(&self, user_id: Uuid) -> RecommendedFeed {
        let snapshot = self.within_budget(self.fetch_snapshot(user_id)).await;
        let (video_ids, short_ids) = match snapshot {
            Ok((videos, watched)) => {
                let watched = Arc::new(watched);
                tokio::join!(
                    self.ranked_or_empty(
                        user_id,
                        CorpusFilter::LongForm,
                        &videos,
                        watched.clone(),
                        self.settings.videos_limit,
                    ),
                    self.ranked_or_empty(
                        user_id,
                        CorpusFilter::Shorts,
                        &videos,
                        watched,
                        self.settings.shorts_limit,
                    )
                )
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to fetch recommendation snapshot"
                );
                (Vec::new(), Vec::new())
            }
        };

        let (videos, shorts) = tokio::join!(
            self.hydrate_bucket(CorpusFilter::LongForm, video_ids, self.settings.videos_limit),
            self.hydrate_bucket(CorpusFilter::Shorts, short_ids, self.settings.shorts_limit)
        );

        RecommendedFeed { videos, shorts }
    }

    async fn fetch_snapshot(
        &self,
        user_id: Uuid,
    ) -> AppResult<(Vec<VideoDocument>, HashSet<VideoId>)> {
        tokio::try_join!(
            self.catalog.fetch_eligible_videos(),
            self.catalog.fetch_watched_video_ids(user_id)
        )
    }

    async fn ranked_or_empty(
        &self,
        user_id: Uuid,
        filter: CorpusFilter,
        videos: &[VideoDocument],
        watched: Arc<HashSet<VideoId>>,
        limit: usize,
    ) -> Vec<VideoId> {
        self.within_budget(self.rank_snapshot(filter, filter.apply(videos), watched, limit))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(
                    user_id = %user_id,
                    filter = %filter,
                    error = %e,
                    "Ranking failed, returning no recommendations"
                );
                Vec::new()
            })
    }

    /// Runs `work` within the configured budget; an overrun is abandoned
    /// and reported as an error.
    async fn within_budget<T>(&self, work: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.settings.timeout, work)
            .await
            .map_err(|_| {
                AppError::Internal(format!(
                    "recommendation exceeded {} ms",
                    self.settings.timeout.as_millis()
                ))
            })?
    }

    async fn rank_snapshot(
        &self,
        filter: CorpusFilter,
        videos: Vec<VideoDocument>,
        watched: Arc<HashSet<VideoId>>,
        limit: usize,
    ) -> AppResult<Vec<VideoId>> {
        if videos.is_empty() || limit == 0 {
            tracing::debug!(filter = %filter, "Empty corpus, nothing to rank");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let corpus_size = videos.len();

        let (mode, candidates) = if has_watch_signal(&videos, &watched) {
            let vectorizer = self.fitted_model(filter, &videos).await?;
            let candidates = tokio::task::spawn_blocking(move || {
                rank_warm_start(&videos, &watched, &vectorizer)
            })
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
            (RankingMode::WarmStart, candidates)
        } else {
            let candidates =
                tokio::task::spawn_blocking(move || rank_cold_start(&videos, &watched))
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;
            (RankingMode::ColdStart, candidates)
        };

        let candidate_count = candidates.len();
        let ids = top_ids(candidates, limit);

        tracing::info!(
            filter = %filter,
            mode = %mode,
            corpus_size,
            candidate_count,
            returned = ids.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Ranking completed"
        );

        Ok(ids)
    }

    /// TF-IDF model for this exact snapshot, from the cache when enabled
    async fn fitted_model(
        &self,
        filter: CorpusFilter,
        videos: &[VideoDocument],
    ) -> AppResult<TfidfVectorizer> {
        let corpus = build_corpus(videos);
        let fit = async move {
            tokio::task::spawn_blocking(move || TfidfVectorizer::fit(&corpus))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))
        };

        match &self.cache {
            Some(cache) => {
                let key = CacheKey::FittedModel {
                    filter,
                    fingerprint: corpus_fingerprint(videos),
                };
                cached!(cache, key, self.settings.model_cache_ttl, fit)
            }
            None => fit.await,
        }
    }

    async fn hydrate_bucket(
        &self,
        filter: CorpusFilter,
        ids: Vec<VideoId>,
        limit: usize,
    ) -> Vec<VideoSummary> {
        let result = if ids.is_empty() {
            tracing::info!(filter = %filter, "No recommendations, falling back to most viewed");
            self.catalog.most_viewed(filter, limit).await
        } else {
            self.catalog.hydrate_videos(&ids).await
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(filter = %filter, error = %e, "Failed to load feed videos");
            Vec::new()
        })
    }
}
