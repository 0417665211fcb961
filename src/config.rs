use crate::services::Collections;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub firebase: FirebaseSettings,
    #[serde(default)]
    pub collections: CollectionSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub database_url: String,
    pub project_id: String,
    pub database_secret: Option<String>,
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Minimum age of the cached signing keys before an unknown key id refetches them
    #[serde(default = "default_key_refetch_interval")]
    pub key_refetch_interval_secs: u64,
    #[serde(default)]
    pub seed_catalog: bool,
}

impl FirebaseSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn key_refetch_interval(&self) -> Duration {
        Duration::from_secs(self.key_refetch_interval_secs)
    }
}

fn default_auth_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_jwks_url() -> String {
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
        .to_string()
}

fn default_request_timeout() -> u64 { 10 }
fn default_key_refetch_interval() -> u64 { 30 }

/// Names of the top-level nodes, overridable per deployment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub users: String,
    pub students: String,
    pub professionals: String,
    pub companies: String,
    pub skill_validations: String,
    pub opportunities: String,
    pub notifications: String,
    pub skills_catalog: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        let defaults = Collections::default();
        Self {
            users: defaults.users,
            students: defaults.students,
            professionals: defaults.professionals,
            companies: defaults.companies,
            skill_validations: defaults.skill_validations,
            opportunities: defaults.opportunities,
            notifications: defaults.notifications,
            skills_catalog: defaults.skills_catalog,
        }
    }
}

impl From<CollectionSettings> for Collections {
    fn from(settings: CollectionSettings) -> Self {
        Self {
            users: settings.users,
            students: settings.students,
            professionals: settings.professionals,
            companies: settings.companies,
            skill_validations: settings.skill_validations,
            opportunities: settings.opportunities,
            notifications: settings.notifications,
            skills_catalog: settings.skills_catalog,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L1-only when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_recommendation_threshold")]
    pub recommendation_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            recommendation_threshold: default_recommendation_threshold(),
        }
    }
}

fn default_recommendation_threshold() -> f64 {
    crate::core::DEFAULT_RECOMMENDATION_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Legacy variable names still honoured on top of the layered sources
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("FIREBASE_APIKEY", "firebase.api_key"),
    ("FIREBASE_DATABASEURL", "firebase.database_url"),
    ("FIREBASE_PROJECTID", "firebase.project_id"),
    ("FIREBASE_DATABASE_SECRET", "firebase.database_secret"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with STUDYCONNECT__)
    /// 4. Legacy FIREBASE_* variables
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STUDYCONNECT__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_legacy_overrides(settings, |name| std::env::var(name).ok())?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("STUDYCONNECT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn apply_legacy_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (variable, key) in LEGACY_OVERRIDES {
        if let Some(value) = lookup(variable) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
