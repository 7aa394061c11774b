use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        recent_distinct_video_ids, CorpusFilter, VideoDocument, VideoId, VideoSummary,
        WatchHistoryEntry, WATCH_HISTORY_LIMIT,
    },
};

/// Video catalog abstraction
///
/// The recommender reads a snapshot of the catalog and a user's watch history
/// through this trait and never writes to either. Implementations must leave
/// soft-deleted videos out of every result.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoCatalog: Send + Sync {
    /// All videos that may be recommended
    async fn fetch_eligible_videos(&self) -> AppResult<Vec<VideoDocument>>;

    /// The user's watch history, most recent first
    async fn fetch_watch_history(&self, user_id: Uuid) -> AppResult<Vec<WatchHistoryEntry>>;

    /// The user's most recently watched distinct videos, at most
    /// [`WATCH_HISTORY_LIMIT`]
    async fn fetch_watched_video_ids(&self, user_id: Uuid) -> AppResult<HashSet<VideoId>> {
        let history = self.fetch_watch_history(user_id).await?;
        Ok(recent_distinct_video_ids(&history, WATCH_HISTORY_LIMIT))
    }

    /// Display records for `ids`, in the same order. Ids that no longer
    /// resolve are skipped.
    async fn hydrate_videos(&self, ids: &[VideoId]) -> AppResult<Vec<VideoSummary>>;

    /// Most viewed videos of a partition, used when a ranking comes back empty
    async fn most_viewed(&self, filter: CorpusFilter, limit: usize) -> AppResult<Vec<VideoSummary>>;
}
