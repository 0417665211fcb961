use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Proficiency rank attached to a validated skill
///
/// Levels are ordered `Beginner < Intermediate < Advanced < Expert` and each
/// carries a fixed weight used by the matching score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[serde(alias = "débutant")]
    Beginner,
    #[serde(alias = "intermédiaire")]
    Intermediate,
    #[serde(alias = "avancé")]
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];

    /// Weight contributed to a match score by one required skill at this level
    #[inline]
    pub fn weight(self) -> f64 {
        match self {
            SkillLevel::Beginner => 0.25,
            SkillLevel::Intermediate => 0.5,
            SkillLevel::Advanced => 0.75,
            SkillLevel::Expert => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown skill level: {0}")]
pub struct UnknownSkillLevel(pub String);

impl FromStr for SkillLevel {
    type Err = UnknownSkillLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" | "débutant" => Ok(SkillLevel::Beginner),
            "intermediate" | "intermédiaire" => Ok(SkillLevel::Intermediate),
            "advanced" | "avancé" => Ok(SkillLevel::Advanced),
            "expert" => Ok(SkillLevel::Expert),
            other => Err(UnknownSkillLevel(other.to_string())),
        }
    }
}

/// Skills a student has had validated, keyed by skill name as stored
///
/// Entries whose stored level is not recognized are dropped when the set is
/// loaded, so they never contribute to a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedSkillSet(HashMap<String, SkillLevel>);

impl ValidatedSkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: impl Into<String>, level: SkillLevel) -> Option<SkillLevel> {
        self.0.insert(skill.into(), level)
    }

    /// Level for a skill name, compared case-sensitively
    #[inline]
    pub fn level(&self, skill: &str) -> Option<SkillLevel> {
        self.0.get(skill).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SkillLevel)> for ValidatedSkillSet {
    fn from_iter<I: IntoIterator<Item = (S, SkillLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(skill, level)| (skill.into(), level)).collect())
    }
}

impl<'de> Deserialize<'de> for ValidatedSkillSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;

        let skills = raw
            .into_iter()
            .flatten()
            .filter_map(|(skill, value)| {
                match value.as_str().map(str::parse::<SkillLevel>) {
                    Some(Ok(level)) => Some((skill, level)),
                    _ => {
                        tracing::debug!("Ignoring skill {} with unrecognized level {}", skill, value);
                        None
                    }
                }
            })
            .collect();

        Ok(Self(skills))
    }
}

/// Account role stored on the `users` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Professional,
    Company,
    School,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Professional => "professional",
            UserType::Company => "company",
            UserType::School => "school",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role record kept under `users/<uid>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Editable part of a student profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StudentProfile {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub school: String,
    pub formation: String,
    pub year_of_study: u16,
    #[serde(default)]
    pub cv_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(flatten)]
    pub profile: StudentProfile,
    #[serde(default)]
    pub competences: Vec<String>,
    #[serde(default)]
    pub validated_skills: ValidatedSkillSet,
    #[serde(default = "student_type")]
    pub user_type: UserType,
    #[serde(default)]
    pub profile_complete: bool,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

fn student_type() -> UserType {
    UserType::Student
}

/// Editable part of a professional profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfessionalProfile {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub expertise_domains: Vec<String>,
    pub years_experience: u16,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: String,
    #[serde(flatten)]
    pub profile: ProfessionalProfile,
    #[serde(default)]
    pub validation_count: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "professional_type")]
    pub user_type: UserType,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

fn professional_type() -> UserType {
    UserType::Professional
}

/// Editable part of a company profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompanyProfile {
    #[validate(length(min = 1))]
    pub name: String,
    pub sector: String,
    /// Headcount bracket (TPE, PME, ETI, large company)
    pub size: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

fn default_country() -> String {
    "France".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub email: String,
    pub contact_person: String,
    pub contact_position: String,
    #[serde(default)]
    pub active_offers: u32,
    #[serde(default = "company_type")]
    pub user_type: UserType,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

fn company_type() -> UserType {
    UserType::Company
}

/// Lifecycle of a skill validation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    #[serde(alias = "en_attente")]
    Pending,
    #[serde(alias = "validée")]
    Validated,
    #[serde(alias = "refusée")]
    Refused,
}

/// A student's request to have a skill validated by a professional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillValidation {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub skill_name: String,
    pub level_claimed: SkillLevel,
    pub evidence_description: String,
    #[serde(default)]
    pub portfolio_links: Option<Vec<String>>,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub professional_id: Option<String>,
    #[serde(default)]
    pub status: ValidationStatus,
    #[serde(default)]
    pub professional_feedback: Option<String>,
    #[serde(default)]
    pub validated_level: Option<SkillLevel>,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub validation_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl SkillValidation {
    pub fn is_pending(&self) -> bool {
        self.status == ValidationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    #[serde(alias = "stage")]
    Internship,
    #[serde(alias = "alternance")]
    WorkStudy,
    #[serde(alias = "emploi")]
    Job,
    #[serde(alias = "projet")]
    Project,
    Freelance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Active,
    Closed,
    Paused,
}

/// Opportunity fields supplied by the publishing company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct OpportunityDraft {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(rename = "type")]
    pub opportunity_type: OpportunityType,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub remote_possible: bool,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub compensation: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    #[serde(flatten)]
    pub draft: OpportunityDraft,
    #[serde(default)]
    pub applications_count: u32,
    #[serde(default)]
    pub views_count: u32,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp_opt")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OpportunityStatus,
}

impl Opportunity {
    pub fn required_skills(&self) -> &[String] {
        &self.draft.required_skills
    }
}

/// Opportunity surfaced to a student with its match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub match_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SkillValidationRequest,
    SkillValidated,
    SkillRefused,
    OpportunityMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(alias = "professional_id")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub read: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 as well as the naive ISO-8601 form (no offset) found in
/// older records, which is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn lenient_timestamp_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) => parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_ordering_and_weights() {
        assert!(SkillLevel::Beginner < SkillLevel::Intermediate);
        assert!(SkillLevel::Advanced < SkillLevel::Expert);
        let weights: Vec<f64> = SkillLevel::ALL.iter().map(|l| l.weight()).collect();
        assert_eq!(weights, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_legacy_level_names() {
        let level: SkillLevel = serde_json::from_value(json!("avancé")).unwrap();
        assert_eq!(level, SkillLevel::Advanced);
        assert_eq!("débutant".parse::<SkillLevel>(), Ok(SkillLevel::Beginner));
        assert_eq!(serde_json::to_value(SkillLevel::Intermediate).unwrap(), json!("intermediate"));
    }

    #[test]
    fn test_skill_set_drops_unknown_levels() {
        let skills: ValidatedSkillSet = serde_json::from_value(json!({
            "python": "expert",
            "sql": "intermédiaire",
            "cobol": "legendary",
            "rust": 3
        }))
        .unwrap();

        assert_eq!(skills.len(), 2);
        assert_eq!(skills.level("python"), Some(SkillLevel::Expert));
        assert_eq!(skills.level("sql"), Some(SkillLevel::Intermediate));
        assert_eq!(skills.level("cobol"), None);
    }

    #[test]
    fn test_student_without_validated_skills() {
        let student: Student = serde_json::from_value(json!({
            "id": "s1",
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "school": "ENS",
            "formation": "Informatique",
            "year_of_study": 3,
            "created_at": "2024-03-01T10:15:30.123456"
        }))
        .unwrap();

        assert!(student.validated_skills.is_empty());
        assert_eq!(student.user_type, UserType::Student);
        assert!(student.created_at.is_some());
    }

    #[test]
    fn test_legacy_validation_status() {
        let status: ValidationStatus = serde_json::from_value(json!("en_attente")).unwrap();
        assert_eq!(status, ValidationStatus::Pending);
        let status: ValidationStatus = serde_json::from_value(json!("validée")).unwrap();
        assert_eq!(status, ValidationStatus::Validated);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T08:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T08:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T08:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
