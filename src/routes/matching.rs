use crate::error::ApiError;
use crate::models::{Opportunity, OpportunityDraft, OpportunityStatus, UserType};
use crate::routes::{AppState, CurrentUser};
use crate::services::notifier;
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/opportunities", web::post().to(create_opportunity))
        .route("/recommendations", web::get().to(recommendations));
}

/// Company publishes an opportunity
///
/// POST /matching/opportunities
///
/// Students whose validated skills clear the recommendation threshold are
/// notified once the opportunity is stored.
async fn create_opportunity(
    state: web::Data<AppState>,
    user: CurrentUser,
    draft: web::Json<OpportunityDraft>,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Company)?;
    draft.validate()?;
    let mut draft = draft.into_inner();

    if draft.company_id.is_empty() {
        draft.company_id = user.uid.clone();
    } else if draft.company_id != user.uid {
        return Err(ApiError::Forbidden(
            "Cannot publish an opportunity for another company".to_string(),
        ));
    }

    let opportunity = Opportunity {
        id: uuid::Uuid::new_v4().to_string(),
        draft,
        applications_count: 0,
        views_count: 0,
        created_at: chrono::Utc::now(),
        deadline: None,
        status: OpportunityStatus::Active,
    };

    state.db.put_opportunity(&opportunity).await?;

    let notified =
        notifier::notify_matching_students(&state.db, &state.recommender, &opportunity).await;

    tracing::info!(
        "Opportunity {} published by {} ({} required skills, {} students notified)",
        opportunity.id,
        user.uid,
        opportunity.required_skills().len(),
        notified
    );

    Ok(HttpResponse::Created().json(opportunity))
}

/// Opportunities matching the calling student's validated skills
///
/// GET /matching/recommendations
///
/// Each opportunity carries its `match_score`; best matches come first.
async fn recommendations(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Student)?;

    let student = state
        .db
        .get_student(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    let opportunities = state.db.list_opportunities().await?;
    let total = opportunities.len();

    let recommended = state
        .recommender
        .recommend(&student.validated_skills, opportunities);

    tracing::info!(
        "Recommended {} of {} opportunities to {} ({} validated skills)",
        recommended.len(),
        total,
        user.uid,
        student.validated_skills.len()
    );

    Ok(HttpResponse::Ok().json(recommended))
}
