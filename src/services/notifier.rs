use crate::core::{filter_relevant_professionals, Recommender};
use crate::models::{Notification, NotificationKind, Opportunity};
use crate::services::{FirebaseClient, FirebaseError};
use serde_json::{json, Value};

/// Store a new unread notification for a user
pub async fn create_notification(
    db: &FirebaseClient,
    user_id: &str,
    kind: NotificationKind,
    message: String,
    data: Value,
) -> Result<Notification, FirebaseError> {
    let notification = Notification {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        kind,
        message,
        data,
        read: false,
        created_at: chrono::Utc::now(),
    };

    db.put_notification(&notification).await?;
    tracing::debug!("Notified {} ({:?})", user_id, kind);

    Ok(notification)
}

/// A user's notifications, newest first
pub async fn list_notifications(
    db: &FirebaseClient,
    user_id: &str,
    unread_only: bool,
) -> Result<Vec<Notification>, FirebaseError> {
    let mut notifications: Vec<Notification> = db
        .notifications_for_user(user_id)
        .await?
        .into_iter()
        .filter(|n| !unread_only || !n.read)
        .collect();

    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(notifications)
}

pub async fn mark_read(db: &FirebaseClient, notification_id: &str) -> Result<(), FirebaseError> {
    db.mark_notification_read(notification_id).await?;
    tracing::debug!("Notification {} marked as read", notification_id);
    Ok(())
}

/// Tell every professional with a relevant expertise domain about a new
/// validation request
///
/// Best-effort: failures are logged and the count of notifications actually
/// stored is returned.
pub async fn notify_relevant_professionals(db: &FirebaseClient, skill_name: &str) -> usize {
    let directory = match db.list_professionals().await {
        Ok(directory) => directory,
        Err(e) => {
            tracing::warn!("Failed to load professionals for {}: {}", skill_name, e);
            return 0;
        }
    };

    let relevant = filter_relevant_professionals(skill_name, &directory);
    let mut notified = 0;

    for professional_id in relevant {
        let result = create_notification(
            db,
            professional_id,
            NotificationKind::SkillValidationRequest,
            format!("New validation request for skill: {}", skill_name),
            json!({ "skill_name": skill_name }),
        )
        .await;

        match result {
            Ok(_) => notified += 1,
            Err(e) => tracing::warn!("Failed to notify professional {}: {}", professional_id, e),
        }
    }

    tracing::info!(
        "Notified {} professionals about skill {} (directory: {})",
        notified,
        skill_name,
        directory.len()
    );

    notified
}

/// Tell every student whose validated skills clear the recommendation
/// threshold about a new opportunity
///
/// Best-effort, like `notify_relevant_professionals`.
pub async fn notify_matching_students(
    db: &FirebaseClient,
    recommender: &Recommender,
    opportunity: &Opportunity,
) -> usize {
    let students = match db.list_students().await {
        Ok(students) => students,
        Err(e) => {
            tracing::warn!("Failed to load students for opportunity {}: {}", opportunity.id, e);
            return 0;
        }
    };

    let interested = recommender.interested_students(opportunity, &students);
    let mut notified = 0;

    for (student_id, score) in interested {
        let result = create_notification(
            db,
            student_id,
            NotificationKind::OpportunityMatch,
            format!("New opportunity matching your skills: {}", opportunity.draft.title),
            json!({ "opportunity_id": opportunity.id, "match_score": score }),
        )
        .await;

        match result {
            Ok(_) => notified += 1,
            Err(e) => tracing::warn!("Failed to notify student {}: {}", student_id, e),
        }
    }

    tracing::info!(
        "Notified {} of {} students about opportunity {}",
        notified,
        students.len(),
        opportunity.id
    );

    notified
}
