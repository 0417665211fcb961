// Route exports
pub mod auth;
pub mod companies;
pub mod guard;
pub mod health;
pub mod matching;
pub mod notifications;
pub mod professionals;
pub mod skills;
pub mod students;

use crate::core::Recommender;
use crate::services::{CacheManager, FirebaseClient, IdentityClient, TokenVerifier};
use actix_web::web;
use std::sync::Arc;

pub use guard::CurrentUser;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<FirebaseClient>,
    pub identity: Arc<IdentityClient>,
    pub verifier: Arc<TokenVerifier>,
    pub cache: Arc<CacheManager>,
    pub recommender: Recommender,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .service(web::scope("/auth").configure(auth::configure))
        .service(web::scope("/skills").configure(skills::configure))
        .service(web::scope("/matching").configure(matching::configure))
        .service(web::scope("/students").configure(students::configure))
        .service(web::scope("/professionals").configure(professionals::configure))
        .service(web::scope("/companies").configure(companies::configure))
        .service(web::scope("/notifications").configure(notifications::configure));
}
