use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{CompanyProfile, ProfessionalProfile, SkillLevel, StudentProfile};

/// Characters the realtime database refuses inside a key
pub const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Reject values that cannot be used as a database key
pub fn validate_store_key(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.contains(FORBIDDEN_KEY_CHARS) {
        let mut error = ValidationError::new("store_key");
        error.message = Some("must not be blank or contain . $ # [ ] /".into());
        return Err(error);
    }
    Ok(())
}

/// Plain email/password account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StudentSignupRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: StudentProfile,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfessionalSignupRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfessionalProfile,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanySignupRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: CompanyProfile,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub contact_person: String,
    pub contact_position: String,
}

/// OAuth2 password-grant style login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Request to have a skill validated
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SkillValidationRequest {
    /// Defaults to the caller; any other student is refused
    #[serde(default)]
    pub student_id: Option<String>,
    #[validate(custom(function = "validate_store_key"))]
    pub skill_name: String,
    pub level_claimed: SkillLevel,
    #[validate(length(min = 1))]
    pub evidence_description: String,
    #[serde(default)]
    pub portfolio_links: Option<Vec<String>>,
    #[serde(default)]
    pub project_description: Option<String>,
}

/// Query string of `PATCH /skills/validate/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateSkillQuery {
    pub validated_level: SkillLevel,
    pub feedback: String,
}

/// Query string of `PATCH /skills/reject/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RejectSkillQuery {
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_key_validation() {
        assert!(validate_store_key("python").is_ok());
        assert!(validate_store_key("data analysis").is_ok());
        assert!(validate_store_key("node.js").is_err());
        assert!(validate_store_key("c#").is_err());
        assert!(validate_store_key("  ").is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let req = SignupRequest {
            email: "ada@example.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_student_signup_flattened() {
        let req: StudentSignupRequest = serde_json::from_value(json!({
            "email": "ada@example.com",
            "password": "secret42",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "school": "ENS",
            "formation": "Informatique",
            "year_of_study": 2
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.profile.email, "ada@example.com");
    }

    #[test]
    fn test_validation_request_rejects_dotted_skill() {
        let req: SkillValidationRequest = serde_json::from_value(json!({
            "skill_name": "node.js",
            "level_claimed": "advanced",
            "evidence_description": "Built an API"
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }
}
