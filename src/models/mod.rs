pub mod video;
pub mod watch_history;

pub use video::{
    ChannelSummary, CorpusFilter, OwnerSummary, RecommendedFeed, VideoDocument, VideoId,
    VideoSummary,
};
pub use watch_history::{recent_distinct_video_ids, WatchHistoryEntry, WATCH_HISTORY_LIMIT};
