use crate::core::matching::calculate_match_score;
use crate::models::{Opportunity, ScoredOpportunity, Student, ValidatedSkillSet};
use std::cmp::Ordering;

/// Scores at or below this value are not surfaced
pub const DEFAULT_RECOMMENDATION_THRESHOLD: f64 = 0.3;

/// Applies the recommendation policy on top of the match score
///
/// Only scores strictly above the threshold are kept, ranked by descending
/// score. Ties keep the order of the input collection.
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    threshold: f64,
}

impl Recommender {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn with_default_threshold() -> Self {
        Self::new(DEFAULT_RECOMMENDATION_THRESHOLD)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    pub fn is_recommended(&self, score: f64) -> bool {
        score > self.threshold
    }

    /// Rank opportunities for a student
    pub fn recommend(
        &self,
        skills: &ValidatedSkillSet,
        opportunities: Vec<Opportunity>,
    ) -> Vec<ScoredOpportunity> {
        let mut recommendations: Vec<ScoredOpportunity> = opportunities
            .into_iter()
            .filter_map(|opportunity| {
                let match_score = calculate_match_score(skills, opportunity.required_skills());
                self.is_recommended(match_score).then_some(ScoredOpportunity {
                    opportunity,
                    match_score,
                })
            })
            .collect();

        // sort_by is stable
        recommendations.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
        });

        recommendations
    }

    /// Students whose validated skills clear the threshold for an opportunity
    ///
    /// Returns `(student id, score)` in the order of `students`.
    pub fn interested_students<'a>(
        &self,
        opportunity: &Opportunity,
        students: &'a [(String, Student)],
    ) -> Vec<(&'a str, f64)> {
        students
            .iter()
            .filter_map(|(id, student)| {
                let score =
                    calculate_match_score(&student.validated_skills, opportunity.required_skills());
                self.is_recommended(score).then_some((id.as_str(), score))
            })
            .collect()
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_threshold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OpportunityDraft, OpportunityStatus, OpportunityType, SkillLevel};
    use chrono::Utc;

    fn create_opportunity(id: &str, required: &[&str]) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            draft: OpportunityDraft {
                title: format!("Opportunity {}", id),
                company_id: "acme".to_string(),
                opportunity_type: OpportunityType::Internship,
                description: "Test".to_string(),
                required_skills: required.iter().map(|s| s.to_string()).collect(),
                preferred_skills: vec![],
                location: "Paris".to_string(),
                remote_possible: false,
                duration: None,
                compensation: None,
                requirements: vec![],
                benefits: vec![],
            },
            applications_count: 0,
            views_count: 0,
            created_at: Utc::now(),
            deadline: None,
            status: OpportunityStatus::Active,
        }
    }

    fn skills() -> ValidatedSkillSet {
        [
            ("python", SkillLevel::Expert),
            ("sql", SkillLevel::Intermediate),
            ("figma", SkillLevel::Beginner),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_recommendations_sorted_descending() {
        let recommender = Recommender::with_default_threshold();
        let opportunities = vec![
            create_opportunity("sql-only", &["sql"]),       // 0.5
            create_opportunity("python", &["python"]),      // 1.0
            create_opportunity("mixed", &["python", "go"]), // 0.5
            create_opportunity("design", &["figma"]),       // 0.25
        ];

        let result = recommender.recommend(&skills(), opportunities);
        let ids: Vec<&str> = result.iter().map(|r| r.opportunity.id.as_str()).collect();

        assert_eq!(ids, vec!["python", "sql-only", "mixed"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let recommender = Recommender::new(0.5);
        let result = recommender.recommend(&skills(), vec![create_opportunity("sql", &["sql"])]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_requirements_never_recommended() {
        let recommender = Recommender::new(0.0);
        let result = recommender.recommend(&skills(), vec![create_opportunity("open", &[])]);
        assert!(result.is_empty());
    }
}
