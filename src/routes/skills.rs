use crate::core::is_relevant_to_any;
use crate::error::ApiError;
use crate::models::{
    MessageResponse, NotificationKind, RejectSkillQuery, SkillValidation, SkillValidationRequest,
    UserType, ValidateSkillQuery, ValidationStatus,
};
use crate::routes::{AppState, CurrentUser};
use crate::services::notifier;
use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/validation-request", web::post().to(request_validation))
        .route("/validation-request/{id}", web::delete().to(cancel_validation_request))
        .route("/pending-validations", web::get().to(pending_validations))
        .route("/validate/{id}", web::patch().to(validate_skill))
        .route("/reject/{id}", web::patch().to(reject_skill))
        .route("/my-validations", web::get().to(my_validations))
        .route("/catalog", web::get().to(catalog));
}

/// Student asks for a skill to be validated
///
/// POST /skills/validation-request
///
/// Request body:
/// ```json
/// {
///   "skill_name": "python",
///   "level_claimed": "advanced",
///   "evidence_description": "string",
///   "portfolio_links": ["string"],
///   "project_description": "string"
/// }
/// ```
async fn request_validation(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<SkillValidationRequest>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;
    req.validate()?;
    let req = req.into_inner();

    if let Some(student_id) = &req.student_id {
        if student_id != &user.uid {
            return Err(ApiError::Forbidden(
                "Cannot request a validation for another student".to_string(),
            ));
        }
    }

    let validation = SkillValidation {
        id: uuid::Uuid::new_v4().to_string(),
        student_id: user.uid.clone(),
        skill_name: req.skill_name,
        level_claimed: req.level_claimed,
        evidence_description: req.evidence_description,
        portfolio_links: req.portfolio_links,
        project_description: req.project_description,
        professional_id: None,
        status: ValidationStatus::Pending,
        professional_feedback: None,
        validated_level: None,
        validation_date: None,
        created_at: chrono::Utc::now(),
    };

    state.db.put_validation(&validation).await?;

    let notified = notifier::notify_relevant_professionals(&state.db, &validation.skill_name).await;

    tracing::info!(
        "Validation {} requested by {} for {} ({} professionals notified)",
        validation.id,
        user.uid,
        validation.skill_name,
        notified
    );

    Ok(HttpResponse::Created().json(validation))
}

/// Pending requests in the calling professional's domains
///
/// GET /skills/pending-validations
async fn pending_validations(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Professional)?;

    let professional = state
        .db
        .get_professional(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Professional profile not found".to_string()))?;

    let domains = &professional.profile.expertise_domains;

    let pending: Vec<SkillValidation> = state
        .db
        .list_validations()
        .await?
        .into_iter()
        .filter(|v| v.is_pending() && is_relevant_to_any(&v.skill_name, domains))
        .collect();

    tracing::debug!("{} pending validations for {}", pending.len(), user.uid);

    Ok(HttpResponse::Ok().json(pending))
}

/// Professional validates a skill
///
/// PATCH /skills/validate/{id}?validated_level=advanced&feedback=...
async fn validate_skill(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<ValidateSkillQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Professional)?;
    let validation_id = path.into_inner();

    let validation = state
        .db
        .get_validation(&validation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Validation request not found".to_string()))?;

    let level = query.validated_level;

    state
        .db
        .update_validation(
            &validation_id,
            &json!({
                "status": ValidationStatus::Validated,
                "professional_id": user.uid,
                "validated_level": level,
                "professional_feedback": query.feedback,
                "validation_date": chrono::Utc::now(),
            }),
        )
        .await?;

    state
        .db
        .set_validated_skill(&validation.student_id, &validation.skill_name, level)
        .await?;

    let count = state.db.increment_validation_count(&user.uid).await?;

    if let Err(e) = notifier::create_notification(
        &state.db,
        &validation.student_id,
        NotificationKind::SkillValidated,
        format!("Your skill {} was validated at level {}", validation.skill_name, level),
        json!({ "validation_id": validation_id, "validated_level": level }),
    )
    .await
    {
        tracing::warn!("Failed to notify student {}: {}", validation.student_id, e);
    }

    tracing::info!(
        "Validation {} accepted by {} at {} (total: {})",
        validation_id,
        user.uid,
        level,
        count
    );

    Ok(HttpResponse::Ok().json(MessageResponse::new("Skill validated successfully")))
}

/// Professional refuses a validation request
///
/// PATCH /skills/reject/{id}?feedback=...
async fn reject_skill(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<RejectSkillQuery>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Professional)?;
    let validation_id = path.into_inner();

    let validation = state
        .db
        .get_validation(&validation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Validation request not found".to_string()))?;

    if !validation.is_pending() {
        return Err(ApiError::BadRequest(
            "Cannot refuse a request that was already processed".to_string(),
        ));
    }

    state
        .db
        .update_validation(
            &validation_id,
            &json!({
                "status": ValidationStatus::Refused,
                "professional_id": user.uid,
                "professional_feedback": query.feedback,
                "validation_date": chrono::Utc::now(),
            }),
        )
        .await?;

    if let Err(e) = notifier::create_notification(
        &state.db,
        &validation.student_id,
        NotificationKind::SkillRefused,
        format!("Your validation request for {} was refused", validation.skill_name),
        json!({ "validation_id": validation_id }),
    )
    .await
    {
        tracing::warn!("Failed to notify student {}: {}", validation.student_id, e);
    }

    tracing::info!("Validation {} refused by {}", validation_id, user.uid);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Validation request refused")))
}

/// Calling student's validation requests, newest first
///
/// GET /skills/my-validations
async fn my_validations(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;

    let mut validations: Vec<SkillValidation> = state
        .db
        .list_validations()
        .await?
        .into_iter()
        .filter(|v| v.student_id == user.uid)
        .collect();

    validations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(HttpResponse::Ok().json(validations))
}

/// Student withdraws a pending request
///
/// DELETE /skills/validation-request/{id}
async fn cancel_validation_request(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;
    let validation_id = path.into_inner();

    let validation = state
        .db
        .get_validation(&validation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Validation request not found".to_string()))?;

    if validation.student_id != user.uid {
        return Err(ApiError::Forbidden(
            "Not allowed to delete this request".to_string(),
        ));
    }

    if !validation.is_pending() {
        return Err(ApiError::BadRequest(
            "Cannot cancel a request that was already processed".to_string(),
        ));
    }

    state.db.remove_validation(&validation_id).await?;

    tracing::info!("Validation {} cancelled by {}", validation_id, user.uid);

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Validation request cancelled successfully",
    )))
}

/// GET /skills/catalog
async fn catalog(state: web::Data<AppState>, _user: CurrentUser) -> Result<HttpResponse, ApiError> {
    let catalog = state.db.get_catalog().await?;
    Ok(HttpResponse::Ok().json(catalog))
}
