// Core algorithm exports
pub mod matching;
pub mod recommender;
pub mod relevance;

pub use matching::calculate_match_score;
pub use recommender::{Recommender, DEFAULT_RECOMMENDATION_THRESHOLD};
pub use relevance::{filter_relevant_professionals, is_relevant, is_relevant_to_any};
