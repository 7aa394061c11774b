use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Identifier for a video in its canonical string form
///
/// Identifiers reach the engine from different sources (catalog rows, watch
/// history, request payloads) and may be spelled differently. Anything that
/// parses as a UUID is stored lowercase and hyphenated, other identifiers are
/// trimmed, so equality and hashing always compare the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Canonicalizes an identifier from any of its string representations
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        match Uuid::parse_str(trimmed) {
            Ok(uuid) => Self::from(uuid),
            Err(_) => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the UUID behind this id, if it is one
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }
}

impl From<Uuid> for VideoId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

impl From<String> for VideoId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for VideoId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of a catalog video, restricted to what ranking needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDocument {
    pub id: VideoId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub views: u64,
    pub is_short: bool,
    pub updated_at: DateTime<Utc>,
}

impl VideoDocument {
    /// Text the vectorizer sees for this video: title, description and
    /// category joined by single spaces, absent fields as empty strings
    pub fn corpus_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default()
        )
    }
}

/// Which slice of the catalog a ranking is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFilter {
    #[default]
    All,
    #[serde(rename = "videos")]
    LongForm,
    Shorts,
}

impl CorpusFilter {
    pub fn admits(&self, video: &VideoDocument) -> bool {
        match self {
            CorpusFilter::All => true,
            CorpusFilter::LongForm => !video.is_short,
            CorpusFilter::Shorts => video.is_short,
        }
    }

    /// Keeps only the videos this filter admits, preserving order
    pub fn apply(&self, videos: &[VideoDocument]) -> Vec<VideoDocument> {
        videos.iter().filter(|v| self.admits(v)).cloned().collect()
    }
}

impl Display for CorpusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusFilter::All => write!(f, "all"),
            CorpusFilter::LongForm => write!(f, "videos"),
            CorpusFilter::Shorts => write!(f, "shorts"),
        }
    }
}

/// Display data for the owner of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

/// Display data for the channel a video belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub owner: OwnerSummary,
}

/// Fully hydrated video record returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: VideoId,
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub duration: f64,
    pub views: u64,
    pub is_short: bool,
    pub created_at: DateTime<Utc>,
    pub channel: ChannelSummary,
}

/// Response body of the recommended feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedFeed {
    pub videos: Vec<VideoSummary>,
    pub shorts: Vec<VideoSummary>,
}
