// Unit tests for StudyConnect matching

use studyconnect::core::{
    calculate_match_score, filter_relevant_professionals, is_relevant, is_relevant_to_any,
    Recommender,
};
use studyconnect::models::{
    Professional, ProfessionalProfile, SkillLevel, UserType, ValidatedSkillSet,
};

fn skills(entries: &[(&str, SkillLevel)]) -> ValidatedSkillSet {
    entries.iter().map(|(name, level)| (*name, *level)).collect()
}

fn required(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn create_professional(id: &str, domains: &[&str]) -> (String, Professional) {
    let professional = Professional {
        id: id.to_string(),
        profile: ProfessionalProfile {
            email: format!("{}@example.com", id),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            expertise_domains: domains.iter().map(|d| d.to_string()).collect(),
            years_experience: 10,
            phone: None,
            linkedin_url: None,
            bio: None,
        },
        validation_count: 0,
        rating: 0.0,
        user_type: UserType::Professional,
        verified: false,
        created_at: None,
    };
    (id.to_string(), professional)
}

#[test]
fn test_score_empty_requirements() {
    let s = skills(&[("python", SkillLevel::Expert)]);
    assert_eq!(calculate_match_score(&s, &[]), 0.0);
    assert_eq!(calculate_match_score(&ValidatedSkillSet::new(), &[]), 0.0);
}

#[test]
fn test_score_no_validated_skills() {
    let r = required(&["python", "sql", "docker"]);
    assert_eq!(calculate_match_score(&ValidatedSkillSet::new(), &r), 0.0);
}

#[test]
fn test_score_single_expert() {
    let s = skills(&[("python", SkillLevel::Expert)]);
    assert_eq!(calculate_match_score(&s, &required(&["python"])), 1.0);
}

#[test]
fn test_score_partial_coverage() {
    let s = skills(&[("python", SkillLevel::Intermediate)]);
    assert_eq!(calculate_match_score(&s, &required(&["python", "sql"])), 0.25);
}

#[test]
fn test_score_mixed_levels() {
    let s = skills(&[
        ("python", SkillLevel::Advanced),
        ("sql", SkillLevel::Beginner),
        ("git", SkillLevel::Expert),
    ]);
    // (0.75 + 0.25 + 0.0) / 3
    let score = calculate_match_score(&s, &required(&["python", "sql", "docker"]));
    assert!((score - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_score_bounds() {
    let s = skills(&[
        ("python", SkillLevel::Expert),
        ("sql", SkillLevel::Expert),
        ("react", SkillLevel::Beginner),
    ]);

    let lists = [
        required(&["python"]),
        required(&["python", "python", "sql"]),
        required(&["react", "vue", "angular", "svelte"]),
        required(&["cobol"]),
    ];

    for r in &lists {
        let score = calculate_match_score(&s, r);
        assert!((0.0..=1.0).contains(&score), "score {} out of range for {:?}", score, r);
    }
}

#[test]
fn test_score_is_pure() {
    let s = skills(&[("python", SkillLevel::Advanced), ("sql", SkillLevel::Intermediate)]);
    let r = required(&["python", "sql", "docker"]);

    assert_eq!(calculate_match_score(&s, &r), calculate_match_score(&s, &r));
}

#[test]
fn test_relevance_substring() {
    assert!(is_relevant("java", "javascript"));
    assert!(is_relevant("python", "Python Development"));
    assert!(!is_relevant("react", "frontend development"));
}

#[test]
fn test_relevance_case_insensitive() {
    assert!(is_relevant("Design", "design"));
    assert!(is_relevant("SQL", "sql databases"));
}

#[test]
fn test_relevance_any_domain() {
    let domains = vec!["Data Science".to_string(), "Machine Learning".to_string()];
    assert!(is_relevant_to_any("machine learning", &domains));
    assert!(!is_relevant_to_any("photoshop", &domains));
    assert!(!is_relevant_to_any::<String>("python", &[]));
}

#[test]
fn test_relevance_filter_preserves_directory_order() {
    let directory = vec![
        create_professional("p1", &["JavaScript", "React"]),
        create_professional("p2", &["Marketing"]),
        create_professional("p3", &["java"]),
        create_professional("p4", &[]),
    ];

    assert_eq!(filter_relevant_professionals("java", &directory), vec!["p1", "p3"]);
    assert!(filter_relevant_professionals("seo", &directory).is_empty());
}

#[test]
fn test_threshold_is_strict() {
    let recommender = Recommender::with_default_threshold();

    assert!(!recommender.is_recommended(0.3));
    assert!(recommender.is_recommended(0.31));
    assert!(!recommender.is_recommended(0.0));
}
