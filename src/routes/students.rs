use crate::error::ApiError;
use crate::models::{MessageResponse, StudentProfile, UserType};
use crate::routes::{AppState, CurrentUser};
use crate::services::CacheKey;
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(get_profile))
        .route("/profile", web::patch().to(update_profile));
}

/// GET /students/profile
async fn get_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;

    let student = state
        .db
        .get_student(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(student))
}

/// Replace the editable part of the caller's profile
///
/// PATCH /students/profile
async fn update_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
    profile: web::Json<StudentProfile>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;
    profile.validate()?;

    if state.db.get_student(&user.uid).await?.is_none() {
        return Err(ApiError::NotFound("Student profile not found".to_string()));
    }

    state.db.update_student_profile(&user.uid, &profile).await?;
    state.db.mark_profile_complete(&user.uid).await?;

    if let Err(e) = state.cache.delete(&CacheKey::user(&user.uid)).await {
        tracing::warn!("Failed to evict cached user {}: {}", user.uid, e);
    }

    tracing::info!("Updated student profile {}", user.uid);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Profile updated successfully")))
}
