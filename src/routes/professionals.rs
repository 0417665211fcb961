use crate::error::ApiError;
use crate::models::{SkillValidation, UserType, ValidationStats, ValidationStatus};
use crate::routes::{AppState, CurrentUser};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Datelike, Utc};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(get_profile))
        .route("/validation-stats", web::get().to(validation_stats));
}

/// GET /professionals/profile
async fn get_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Professional)?;

    let professional = state
        .db
        .get_professional(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Professional profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(professional))
}

/// GET /professionals/validation-stats
async fn validation_stats(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Professional)?;

    let professional = state
        .db
        .get_professional(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Professional profile not found".to_string()))?;

    let validations = state.db.validations_for_professional(&user.uid).await?;
    let processed: Vec<&SkillValidation> = validations
        .iter()
        .filter(|v| v.status != ValidationStatus::Pending)
        .collect();

    let now = Utc::now();
    let stats = ValidationStats {
        total_validations: processed.len(),
        validations_this_month: processed
            .iter()
            .filter(|v| v.validation_date.map_or(false, |date| same_month(date, now)))
            .count(),
        average_rating: professional.rating,
        expertise_domains: professional.profile.expertise_domains,
    };

    Ok(HttpResponse::Ok().json(stats))
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
