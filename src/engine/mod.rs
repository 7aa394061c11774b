//! Content-based recommendation engine
//!
//! Every ranking is computed from scratch over the snapshot it is handed:
//! the corpus is tokenized, a TF-IDF model is fitted on it, and unwatched
//! videos are scored by cosine similarity against the user's profile vector,
//! or by popularity when the user has no usable history.

pub mod scorer;
pub mod tokenizer;
pub mod vectorizer;

pub use scorer::{
    build_corpus, has_watch_signal, rank_cold_start, rank_warm_start, recommend, top_ids,
    RankingMode, ScoredCandidate,
};
pub use tokenizer::tokenize;
pub use vectorizer::{DocumentVector, TfidfVectorizer};
