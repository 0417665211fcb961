use crate::error::ApiError;
use crate::models::UserType;
use crate::routes::{AppState, CurrentUser};
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(get_profile))
        .route("/opportunities", web::get().to(list_opportunities));
}

/// GET /companies/profile
async fn get_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Company)?;

    let company = state
        .db
        .get_company(&user.uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(company))
}

/// Opportunities published by the calling company, newest first
///
/// GET /companies/opportunities
async fn list_opportunities(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    user.require(UserType::Company)?;

    let mut opportunities = state.db.opportunities_for_company(&user.uid).await?;
    opportunities.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    tracing::debug!("{} opportunities for company {}", opportunities.len(), user.uid);

    Ok(HttpResponse::Ok().json(opportunities))
}
