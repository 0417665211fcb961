use crate::error::ApiError;
use crate::models::{MessageResponse, NotificationsQuery};
use crate::routes::{AppState, CurrentUser};
use crate::services::notifier;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_notifications))
        .route("/{id}/read", web::patch().to(mark_read));
}

/// Caller's notifications, newest first
///
/// GET /notifications?unread_only=true
async fn list_notifications(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<NotificationsQuery>,
) -> Result<HttpResponse, ApiError> {
    let notifications =
        notifier::list_notifications(&state.db, &user.uid, query.unread_only).await?;

    Ok(HttpResponse::Ok().json(notifications))
}

/// PATCH /notifications/{id}/read
async fn mark_read(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let notification_id = path.into_inner();

    let notification = state
        .db
        .get_notification(&notification_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    if notification.user_id != user.uid {
        return Err(ApiError::Forbidden(
            "Not allowed to modify this notification".to_string(),
        ));
    }

    notifier::mark_read(&state.db, &notification_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Notification marked as read")))
}
