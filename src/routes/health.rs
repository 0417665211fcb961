use crate::models::HealthResponse;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health_check));
}

/// Service banner and endpoint map
async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the StudyConnect API",
        "description": "Skills validation and student/company matching platform",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth",
            "skills": "/skills",
            "matching": "/matching",
            "students": "/students",
            "professionals": "/professionals",
            "companies": "/companies",
            "notifications": "/notifications"
        }
    }))
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "StudyConnect API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
