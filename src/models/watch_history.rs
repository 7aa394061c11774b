use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::VideoId;

/// One entry of a user's watch history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    pub video_id: VideoId,
    pub watched_at: DateTime<Utc>,
    /// Playback progress in seconds
    pub progress: f64,
}

/// Distinct videos a user's history keeps for exclusion
pub const WATCH_HISTORY_LIMIT: usize = 100;

/// The `limit` most recently watched distinct videos.
///
/// Rewatches collapse onto one video, so a single video watched many times
/// never pushes older videos out of the set. Order, progress and recency
/// beyond this cut are ignored by ranking.
pub fn recent_distinct_video_ids(
    entries: &[WatchHistoryEntry],
    limit: usize,
) -> HashSet<VideoId> {
    let mut by_recency: Vec<&WatchHistoryEntry> = entries.iter().collect();
    by_recency.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));

    let mut ids = HashSet::new();
    for entry in by_recency {
        if ids.len() == limit {
            break;
        }
        ids.insert(entry.video_id.clone());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(id: &str, minutes_ago: i64) -> WatchHistoryEntry {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        WatchHistoryEntry {
            video_id: VideoId::new(id),
            watched_at: now - Duration::minutes(minutes_ago),
            progress: 10.0,
        }
    }

    #[test]
    fn test_rewatches_collapse() {
        let history = vec![entry("a", 1), entry("b", 2), entry("a", 3)];
        let ids = recent_distinct_video_ids(&history, WATCH_HISTORY_LIMIT);

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&VideoId::new("a")));
        assert!(ids.contains(&VideoId::new("b")));
    }

    #[test]
    fn test_rewatches_do_not_evict_older_videos() {
        let mut history: Vec<WatchHistoryEntry> =
            (0..WATCH_HISTORY_LIMIT as i64).map(|i| entry("x", i)).collect();
        history.push(entry("y", 1_000));

        let ids = recent_distinct_video_ids(&history, WATCH_HISTORY_LIMIT);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&VideoId::new("y")));
    }

    #[test]
    fn test_limit_keeps_most_recent_videos() {
        let history = vec![entry("old", 30), entry("new", 1), entry("mid", 10)];
        let ids = recent_distinct_video_ids(&history, 2);

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&VideoId::new("new")));
        assert!(ids.contains(&VideoId::new("mid")));
    }

    #[test]
    fn test_uuid_spellings_are_one_video() {
        let history = vec![
            entry("67e55044-10b1-426f-9247-bb680e5fe0c8", 1),
            entry("67E55044-10B1-426F-9247-BB680E5FE0C8", 2),
        ];
        assert_eq!(recent_distinct_video_ids(&history, WATCH_HISTORY_LIMIT).len(), 1);
    }

    #[test]
    fn test_empty_history() {
        assert!(recent_distinct_video_ids(&[], WATCH_HISTORY_LIMIT).is_empty());
    }
}
