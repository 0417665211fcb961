//! StudyConnect - skills validation and opportunity matching service
//!
//! Students submit skills for validation by professionals working in a
//! relevant domain, companies publish opportunities, and students are
//! recommended the opportunities whose required skills they have validated.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, filter_relevant_professionals, is_relevant, Recommender};
pub use error::ApiError;
pub use models::{Opportunity, ScoredOpportunity, SkillLevel, ValidatedSkillSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let skills: ValidatedSkillSet = [("rust", SkillLevel::Expert)].into_iter().collect();
        assert_eq!(calculate_match_score(&skills, &["rust".to_string()]), 1.0);
        assert!(is_relevant("rust", "Rust"));
    }
}
