// Model exports
pub mod catalog;
pub mod domain;
pub mod requests;
pub mod responses;

pub use catalog::{default_catalog, CatalogEntry, SkillsCatalog};
pub use domain::{
    Company, CompanyProfile, Notification, NotificationKind, Opportunity, OpportunityDraft,
    OpportunityStatus, OpportunityType, Professional, ProfessionalProfile, ScoredOpportunity,
    SkillLevel, SkillValidation, Student, StudentProfile, UserRecord, UserType,
    ValidatedSkillSet, ValidationStatus,
};
pub use requests::{
    CompanySignupRequest, LoginForm, NotificationsQuery, ProfessionalSignupRequest,
    RejectSkillQuery, SignupRequest, SkillValidationRequest, StudentSignupRequest,
    ValidateSkillQuery,
};
pub use responses::{
    CurrentUserResponse, ErrorResponse, HealthResponse, MessageResponse, TokenResponse,
    ValidationStats,
};
