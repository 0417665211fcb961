use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use studyconnect::config::{LoggingSettings, Settings};
use studyconnect::core::Recommender;
use studyconnect::error::{
    handle_form_payload_error, handle_json_payload_error, handle_path_error,
    handle_query_payload_error,
};
use studyconnect::models::default_catalog;
use studyconnect::routes::{self, AppState};
use studyconnect::services::{CacheManager, FirebaseClient, IdentityClient, TokenVerifier};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, e);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging);

    info!("Starting StudyConnect service...");

    let timeout = settings.firebase.request_timeout();

    let db = Arc::new(
        FirebaseClient::new(
            settings.firebase.database_url.clone(),
            settings.firebase.database_secret.clone(),
            timeout,
            settings.collections.clone().into(),
        )
        .map_err(|e| startup_error("Failed to build database client", e))?,
    );

    if settings.firebase.database_secret.is_none() {
        warn!("No database secret configured, requests are sent unauthenticated");
    }

    let identity = Arc::new(
        IdentityClient::new(
            settings.firebase.auth_endpoint.clone(),
            settings.firebase.api_key.clone(),
            timeout,
        )
        .map_err(|e| startup_error("Failed to build identity client", e))?,
    );

    let verifier = Arc::new(
        TokenVerifier::new(
            settings.firebase.jwks_url.clone(),
            settings.firebase.project_id.clone(),
            timeout,
        )
        .map_err(|e| startup_error("Failed to build token verifier", e))?
        .with_min_refetch_interval(settings.firebase.key_refetch_interval()),
    );

    info!("Firebase clients initialized for project {}", settings.firebase.project_id);

    // Redis is optional; without it the cache runs in-process only
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!(
                "Cache manager initialized (L1: {} entries, TTL: {}s, redis: {})",
                l1_cache_size,
                cache_ttl,
                c.has_redis()
            );
            Arc::new(c)
        }
        Err(e) => {
            error!("Failed to connect to Redis ({}), running with in-process cache only", e);
            Arc::new(CacheManager::local(l1_cache_size, cache_ttl))
        }
    };

    if settings.firebase.seed_catalog {
        match db.seed_catalog_if_empty(&default_catalog()).await {
            Ok(true) => info!("Skills catalog seeded"),
            Ok(false) => info!("Skills catalog already present"),
            Err(e) => warn!("Failed to seed skills catalog: {}", e),
        }
    }

    let recommender = Recommender::new(settings.matching.recommendation_threshold);

    info!("Recommender initialized (threshold: {})", recommender.threshold());

    let app_state = AppState {
        db,
        identity,
        verifier,
        cache,
        recommender,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::FormConfig::default().error_handler(handle_form_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
