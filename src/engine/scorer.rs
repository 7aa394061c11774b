use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;

use super::vectorizer::{DocumentVector, TfidfVectorizer};
use crate::models::{VideoDocument, VideoId};

/// How a ranking was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Cosine similarity against the user's profile vector
    WarmStart,
    /// Popularity by view count, for users without usable history
    ColdStart,
}

impl Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingMode::WarmStart => write!(f, "warm_start"),
            RankingMode::ColdStart => write!(f, "cold_start"),
        }
    }
}

/// A recommendable video with its score: a cosine similarity in warm-start
/// mode, a raw view count in cold-start mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub id: VideoId,
    pub score: f64,
}

/// One corpus document per video, index-aligned with `videos`
pub fn build_corpus(videos: &[VideoDocument]) -> Vec<String> {
    videos.iter().map(VideoDocument::corpus_text).collect()
}

/// True when at least one watched video is still part of the corpus
pub fn has_watch_signal(videos: &[VideoDocument], watched: &HashSet<VideoId>) -> bool {
    videos.iter().any(|video| watched.contains(&video.id))
}

/// Scores every unwatched video by similarity to the profile built from the
/// watched ones. `vectorizer` must have been fitted on `build_corpus(videos)`.
///
/// Returns candidates sorted by descending score; equal scores keep corpus
/// order. An empty vocabulary yields no candidates.
pub fn rank_warm_start(
    videos: &[VideoDocument],
    watched: &HashSet<VideoId>,
    vectorizer: &TfidfVectorizer,
) -> Vec<ScoredCandidate> {
    if vectorizer.is_empty() {
        return Vec::new();
    }

    let vectors = vectorizer.transform(&build_corpus(videos));

    let mut profile = DocumentVector::zeros(vectorizer.vocabulary_size());
    for (video, vector) in videos.iter().zip(&vectors) {
        if watched.contains(&video.id) {
            profile += vector;
        }
    }
    profile.normalize();

    let mut candidates: Vec<ScoredCandidate> = videos
        .iter()
        .zip(&vectors)
        .filter(|(video, _)| !watched.contains(&video.id))
        .map(|(video, vector)| ScoredCandidate {
            id: video.id.clone(),
            score: profile.dot(vector),
        })
        .collect();

    sort_by_score(&mut candidates);
    candidates
}

/// Scores every unwatched video by its view count, most viewed first
pub fn rank_cold_start(
    videos: &[VideoDocument],
    watched: &HashSet<VideoId>,
) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = videos
        .iter()
        .filter(|video| !watched.contains(&video.id))
        .map(|video| ScoredCandidate {
            id: video.id.clone(),
            score: video.views as f64,
        })
        .collect();

    sort_by_score(&mut candidates);
    candidates
}

fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    // Stable, so ties keep corpus order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Identifiers of the first `limit` candidates
pub fn top_ids(candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<VideoId> {
    candidates
        .into_iter()
        .take(limit)
        .map(|candidate| candidate.id)
        .collect()
}

/// Ranks `videos` for a user who has watched `watched`, fitting a fresh
/// model on the snapshot. Returns at most `limit` identifiers, never one the
/// user has already watched.
pub fn recommend(
    videos: &[VideoDocument],
    watched: &HashSet<VideoId>,
    limit: usize,
) -> Vec<VideoId> {
    if videos.is_empty() || limit == 0 {
        return Vec::new();
    }

    let candidates = if has_watch_signal(videos, watched) {
        let vectorizer = TfidfVectorizer::fit(&build_corpus(videos));
        rank_warm_start(videos, watched, &vectorizer)
    } else {
        rank_cold_start(videos, watched)
    };

    top_ids(candidates, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(id: &str, title: &str, views: u64) -> VideoDocument {
        VideoDocument {
            id: VideoId::new(id),
            title: Some(title.to_string()),
            description: None,
            category: None,
            views,
            is_short: false,
            updated_at: Utc::now(),
        }
    }

    fn watched(ids: &[&str]) -> HashSet<VideoId> {
        ids.iter().map(VideoId::new).collect()
    }

    fn ids(values: &[&str]) -> Vec<VideoId> {
        values.iter().map(VideoId::new).collect()
    }

    #[test]
    fn test_empty_corpus() {
        assert!(recommend(&[], &watched(&["a"]), 20).is_empty());
        assert!(recommend(&[], &HashSet::new(), 20).is_empty());
    }

    #[test]
    fn test_cold_start_orders_by_views() {
        let videos = vec![video("A", "alpha", 5), video("B", "beta", 50), video("C", "gamma", 10)];

        let result = recommend(&videos, &HashSet::new(), 3);
        assert_eq!(result, ids(&["B", "C", "A"]));
    }

    #[test]
    fn test_cold_start_when_history_left_the_corpus() {
        let videos = vec![video("A", "alpha", 5), video("B", "beta", 50)];

        let result = recommend(&videos, &watched(&["deleted"]), 5);
        assert_eq!(result, ids(&["B", "A"]));
    }

    #[test]
    fn test_warm_start_prefers_shared_terms() {
        let videos = vec![
            video("A", "cooking pasta recipe", 0),
            video("B", "cooking pasta recipe", 0),
            video("C", "rocket launch engineering", 1_000_000),
        ];

        let result = recommend(&videos, &watched(&["A"]), 2);
        assert_eq!(result, ids(&["B", "C"]));
    }

    #[test]
    fn test_warm_start_scores() {
        let videos = vec![
            video("A", "cooking pasta recipe", 0),
            video("B", "cooking pasta recipe", 0),
            video("C", "rocket launch engineering", 0),
        ];
        let corpus = build_corpus(&videos);
        let model = TfidfVectorizer::fit(&corpus);

        let ranked = rank_warm_start(&videos, &watched(&["A"]), &model);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, VideoId::new("B"));
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_watched_videos_never_recommended() {
        let videos = vec![
            video("A", "cooking pasta recipe", 900),
            video("B", "pasta sauce basics", 800),
            video("C", "rocket launch engineering", 700),
            video("D", "baking bread recipe", 600),
        ];
        let history = watched(&["A", "C"]);

        let result = recommend(&videos, &history, 10);
        assert_eq!(result.len(), 2);
        for id in &result {
            assert!(!history.contains(id));
        }
    }

    #[test]
    fn test_watched_matching_uses_canonical_ids() {
        let videos = vec![
            video("67e55044-10b1-426f-9247-bb680e5fe0c8", "cooking pasta recipe", 0),
            video("0d1b2c3a-0000-4000-8000-000000000001", "cooking pasta dinner", 0),
        ];
        let history = watched(&["67E55044-10B1-426F-9247-BB680E5FE0C8"]);

        let result = recommend(&videos, &history, 10);
        assert_eq!(result, ids(&["0d1b2c3a-0000-4000-8000-000000000001"]));
    }

    #[test]
    fn test_limit_respected() {
        let videos: Vec<VideoDocument> = (0..10)
            .map(|i| video(&format!("v{i}"), "cooking pasta recipe", i))
            .collect();

        assert_eq!(recommend(&videos, &HashSet::new(), 2).len(), 2);
        assert_eq!(recommend(&videos, &watched(&["v0"]), 2).len(), 2);
        assert!(recommend(&videos, &HashSet::new(), 0).is_empty());
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let videos = vec![
            video("A", "cooking pasta recipe", 0),
            video("X", "rocket launch", 0),
            video("Y", "medieval castle", 0),
            video("Z", "ocean waves", 0),
        ];

        let result = recommend(&videos, &watched(&["A"]), 3);
        assert_eq!(result, ids(&["X", "Y", "Z"]));

        let cold = recommend(&videos, &HashSet::new(), 4);
        assert_eq!(cold, ids(&["A", "X", "Y", "Z"]));
    }

    #[test]
    fn test_deterministic() {
        let videos = vec![
            video("A", "cooking pasta recipe", 3),
            video("B", "pasta sauce", 2),
            video("C", "rocket launch", 1),
            video("D", "recipe rocket fuel", 9),
        ];
        let history = watched(&["A"]);

        let first = recommend(&videos, &history, 10);
        let second = recommend(&videos, &history, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_vocabulary_yields_nothing_in_warm_start() {
        let videos = vec![video("A", "the and of", 10), video("B", "is it", 20)];

        assert!(recommend(&videos, &watched(&["A"]), 5).is_empty());
        assert_eq!(recommend(&videos, &HashSet::new(), 5), ids(&["B", "A"]));
    }

    #[test]
    fn test_zero_profile_scores_everything_zero() {
        let videos = vec![
            video("A", "the and of", 0),
            video("B", "cooking pasta", 0),
            video("C", "rocket launch", 0),
        ];
        let corpus = build_corpus(&videos);
        let model = TfidfVectorizer::fit(&corpus);

        let ranked = rank_warm_start(&videos, &watched(&["A"]), &model);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.score == 0.0));
    }

    #[test]
    fn test_has_watch_signal() {
        let videos = vec![video("A", "alpha", 0)];
        assert!(has_watch_signal(&videos, &watched(&["A"])));
        assert!(!has_watch_signal(&videos, &watched(&["B"])));
        assert!(!has_watch_signal(&videos, &HashSet::new()));
    }
}
