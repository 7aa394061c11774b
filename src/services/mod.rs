pub mod catalog;
pub mod recommendations;

pub use catalog::VideoCatalog;
pub use recommendations::{RecommendationService, RecommenderSettings};
