use crate::error::ApiError;
use crate::models::{UserRecord, UserType};
use crate::routes::AppState;
use crate::services::CacheKey;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

/// Caller identified by a verified bearer ID token
///
/// Extraction fails with 401 when the token is missing or invalid, or when
/// the account has no `users` record.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub uid: String,
    pub record: UserRecord,
}

impl CurrentUser {
    /// Fail with 403 unless the caller has the given role
    pub fn require(&self, role: UserType) -> Result<(), ApiError> {
        if self.record.user_type == Some(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("Reserved for {} accounts", role)))
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| ApiError::Internal("Application state missing".to_string()))?;
            let token = token.ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

            let claims = state.verifier.verify(&token).await.map_err(|e| {
                tracing::debug!("Rejected ID token: {}", e);
                ApiError::Unauthorized("Invalid token".to_string())
            })?;

            let record = load_user_record(&state, &claims.sub)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

            Ok(CurrentUser {
                uid: claims.sub,
                record,
            })
        })
    }
}

/// Extract the token of an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Role record for an account, served from cache when possible
async fn load_user_record(state: &AppState, uid: &str) -> Result<Option<UserRecord>, ApiError> {
    let key = CacheKey::user(uid);

    if let Ok(record) = state.cache.get::<UserRecord>(&key).await {
        return Ok(Some(record));
    }

    let record = state.db.get_user(uid).await?;

    if let Some(record) = &record {
        if let Err(e) = state.cache.set(&key, record).await {
            tracing::warn!("Failed to cache user record for {}: {}", uid, e);
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi".to_string()));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer   xyz "))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("xyz".to_string()));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_role_requirement() {
        let user = CurrentUser {
            uid: "uid-1".to_string(),
            record: UserRecord {
                email: "ada@example.com".to_string(),
                user_type: Some(UserType::Student),
                ..Default::default()
            },
        };

        assert!(user.require(UserType::Student).is_ok());
        assert!(matches!(user.require(UserType::Company), Err(ApiError::Forbidden(_))));
    }
}
