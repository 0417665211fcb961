use crate::models::{SkillLevel, ValidatedSkillSet};

/// Calculate how well a student's validated skills cover an opportunity (0-1)
///
/// Every entry of `required_skills` counts once, duplicates included. A
/// required skill the student holds contributes its level weight
/// (0.25 / 0.5 / 0.75 / 1.0), an unknown one contributes nothing:
///
/// score = sum(weight(level of skill)) / len(required_skills)
///
/// An opportunity without required skills scores 0.0.
pub fn calculate_match_score(skills: &ValidatedSkillSet, required_skills: &[String]) -> f64 {
    if required_skills.is_empty() {
        return 0.0;
    }

    let total: f64 = required_skills
        .iter()
        .filter_map(|skill| skills.level(skill))
        .map(SkillLevel::weight)
        .sum();

    total / required_skills.len() as f64
}
