use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        ChannelSummary, CorpusFilter, OwnerSummary, VideoDocument, VideoId, VideoSummary,
        WatchHistoryEntry, WATCH_HISTORY_LIMIT,
    },
    services::catalog::VideoCatalog,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, FromRow)]
struct VideoDocumentRow {
    id: Uuid,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    views: i64,
    is_short: bool,
    updated_at: DateTime<Utc>,
}

impl From<VideoDocumentRow> for VideoDocument {
    fn from(row: VideoDocumentRow) -> Self {
        Self {
            id: VideoId::from(row.id),
            title: row.title,
            description: row.description,
            category: row.category,
            views: row.views.max(0) as u64,
            is_short: row.is_short,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct WatchHistoryRow {
    video_id: Uuid,
    watched_at: DateTime<Utc>,
    progress: f64,
}

#[derive(Debug, FromRow)]
struct VideoSummaryRow {
    id: Uuid,
    title: String,
    url: String,
    thumbnail: Option<String>,
    duration: f64,
    views: i64,
    is_short: bool,
    created_at: DateTime<Utc>,
    channel_id: Uuid,
    channel_name: String,
    channel_icon: Option<String>,
    owner_id: Uuid,
    owner_name: String,
    owner_avatar: Option<String>,
}

impl From<VideoSummaryRow> for VideoSummary {
    fn from(row: VideoSummaryRow) -> Self {
        Self {
            id: VideoId::from(row.id),
            title: row.title,
            url: row.url,
            thumbnail: row.thumbnail,
            duration: row.duration,
            views: row.views.max(0) as u64,
            is_short: row.is_short,
            created_at: row.created_at,
            channel: ChannelSummary {
                id: row.channel_id,
                name: row.channel_name,
                icon: row.channel_icon,
                owner: OwnerSummary {
                    id: row.owner_id,
                    name: row.owner_name,
                    avatar: row.owner_avatar,
                },
            },
        }
    }
}

const VIDEO_SUMMARY_SELECT: &str = r#"
    SELECT v.id, v.title, v.url, v.thumbnail, v.duration, v.views, v.is_short, v.created_at,
           c.id AS channel_id, c.name AS channel_name, c.icon AS channel_icon,
           u.id AS owner_id, u.name AS owner_name, u.avatar AS owner_avatar
    FROM videos v
    JOIN channels c ON c.id = v.channel_id
    JOIN users u ON u.id = c.owner_id
"#;

/// Video catalog backed by PostgreSQL
#[derive(Clone)]
pub struct PgVideoCatalog {
    pool: PgPool,
}

impl PgVideoCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoCatalog for PgVideoCatalog {
    async fn fetch_eligible_videos(&self) -> AppResult<Vec<VideoDocument>> {
        let rows: Vec<VideoDocumentRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, category, views, is_short, updated_at
            FROM videos
            WHERE is_deleted = false
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(video_count = rows.len(), "Fetched eligible videos");

        Ok(rows.into_iter().map(VideoDocument::from).collect())
    }

    async fn fetch_watch_history(&self, user_id: Uuid) -> AppResult<Vec<WatchHistoryEntry>> {
        let rows: Vec<WatchHistoryRow> = sqlx::query_as(
            r#"
            SELECT video_id, watched_at, progress
            FROM (
                SELECT DISTINCT ON (video_id) video_id, watched_at, progress
                FROM watch_history
                WHERE user_id = $1
                ORDER BY video_id, watched_at DESC
            ) latest
            ORDER BY watched_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(WATCH_HISTORY_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| WatchHistoryEntry {
                video_id: VideoId::from(row.video_id),
                watched_at: row.watched_at,
                progress: row.progress,
            })
            .collect())
    }

    async fn hydrate_videos(&self, ids: &[VideoId]) -> AppResult<Vec<VideoSummary>> {
        let uuids: Vec<Uuid> = ids.iter().filter_map(VideoId::as_uuid).collect();
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("{VIDEO_SUMMARY_SELECT} WHERE v.id = ANY($1) AND v.is_deleted = false");
        let rows: Vec<VideoSummaryRow> = sqlx::query_as(&query)
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await?;

        // Rows come back in arbitrary order; restore the ranking
        let mut by_id: HashMap<VideoId, VideoSummary> = rows
            .into_iter()
            .map(VideoSummary::from)
            .map(|summary| (summary.id.clone(), summary))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn most_viewed(&self, filter: CorpusFilter, limit: usize) -> AppResult<Vec<VideoSummary>> {
        let short_clause = match filter {
            CorpusFilter::All => "",
            CorpusFilter::LongForm => " AND v.is_short = false",
            CorpusFilter::Shorts => " AND v.is_short = true",
        };
        let query = format!(
            "{VIDEO_SUMMARY_SELECT} WHERE v.is_deleted = false{short_clause} ORDER BY v.views DESC, v.created_at DESC LIMIT $1"
        );

        let rows: Vec<VideoSummaryRow> = sqlx::query_as(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(VideoSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_document_row_conversion() {
        let id = Uuid::new_v4();
        let row = VideoDocumentRow {
            id,
            title: Some("Cooking pasta".to_string()),
            description: None,
            category: Some("General".to_string()),
            views: 42,
            is_short: true,
            updated_at: Utc::now(),
        };

        let doc = VideoDocument::from(row);
        assert_eq!(doc.id, VideoId::from(id));
        assert_eq!(doc.views, 42);
        assert!(doc.is_short);
        assert_eq!(doc.corpus_text(), "Cooking pasta  General");
    }

    #[test]
    fn test_negative_view_counts_clamp_to_zero() {
        let row = VideoDocumentRow {
            id: Uuid::new_v4(),
            title: None,
            description: None,
            category: None,
            views: -3,
            is_short: false,
            updated_at: Utc::now(),
        };
        assert_eq!(VideoDocument::from(row).views, 0);
    }

    #[test]
    fn test_video_summary_row_conversion() {
        let owner_id = Uuid::new_v4();
        let row = VideoSummaryRow {
            id: Uuid::new_v4(),
            title: "Rocket launch".to_string(),
            url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail: None,
            duration: 61.5,
            views: 7,
            is_short: false,
            created_at: Utc::now(),
            channel_id: Uuid::new_v4(),
            channel_name: "Space Daily".to_string(),
            channel_icon: Some("/default-channel.png".to_string()),
            owner_id,
            owner_name: "Ada".to_string(),
            owner_avatar: None,
        };

        let summary = VideoSummary::from(row);
        assert_eq!(summary.channel.name, "Space Daily");
        assert_eq!(summary.channel.owner.id, owner_id);
        assert_eq!(summary.views, 7);
    }
}
