use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the identity service's signing keys are trusted before refetching
const SIGNING_KEYS_TTL: Duration = Duration::from_secs(3600);

/// Minimum age of the cached key set before an unknown key id forces a refetch
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the identity service
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Account already exists for email {0}")]
    EmailExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unknown signing key: {0}")]
    UnknownKey(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Identity service returned error: {0}")]
    ApiError(String),
}

/// Tokens returned by a successful sign-up or sign-in
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Identity Toolkit REST client (account creation and password sign-in)
pub struct IdentityClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl IdentityClient {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    /// Create an email/password account
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        tracing::debug!("Creating account for {}", email);
        self.call("accounts:signUp", email, password).await
    }

    /// Exchange email and password for an ID token
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        tracing::debug!("Signing in {}", email);
        self.call("accounts:signInWithPassword", email, password).await
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), method);

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuthError::ApiError(format!("Invalid {} response: {}", method, e)));
        }

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or_default();

        tracing::debug!("{} failed for {}: {} {}", method, email, status, message);

        Err(classify_identity_error(message, email, status.as_u16()))
    }
}

/// Map an Identity Toolkit error message onto an `AuthError`
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be
/// at least 6 characters`.
pub fn classify_identity_error(message: &str, email: &str, status: u16) -> AuthError {
    let code = message.split(':').next().unwrap_or_default().trim();

    match code {
        "EMAIL_EXISTS" => AuthError::EmailExists(email.to_string()),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "" => AuthError::ApiError(format!("status {}", status)),
        _ => AuthError::ApiError(message.to_string()),
    }
}

/// Claims of an identity-service ID token
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Account uid
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
}

/// Key set as last fetched from the identity service
struct SigningKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Verifies RS256 ID tokens against the identity service's published keys
///
/// The key set is cached and refetched once it is an hour old. A token signed
/// with a key id missing from the cached set triggers one early refetch, at
/// most once per `min_refetch_interval`, so rotated keys are picked up.
pub struct TokenVerifier {
    jwks_url: String,
    project_id: String,
    client: Client,
    keys: moka::future::Cache<(), Arc<SigningKeys>>,
    min_refetch_interval: Duration,
}

impl TokenVerifier {
    pub fn new(jwks_url: String, project_id: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;

        let keys = moka::future::CacheBuilder::new(1)
            .time_to_live(SIGNING_KEYS_TTL)
            .build();

        Ok(Self {
            jwks_url,
            project_id,
            client,
            keys,
            min_refetch_interval: MIN_REFETCH_INTERVAL,
        })
    }

    pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    /// Check signature, audience, issuer and expiry of an ID token
    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let data = decode::<IdTokenClaims>(token, &key, &self.validation())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation
    }

    /// Decoding key for a key id, refetching the key set once if it is unknown
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let keys = self.signing_keys().await?;

        let keys = if keys.set.find(kid).is_some() {
            keys
        } else if keys.fetched_at.elapsed() >= self.min_refetch_interval {
            tracing::debug!("Key {} not in cached set, refetching", kid);
            self.keys.invalidate(&()).await;
            self.signing_keys().await?
        } else {
            return Err(AuthError::UnknownKey(kid.to_string()));
        };

        let jwk = keys
            .set
            .find(kid)
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?;

        DecodingKey::from_jwk(jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    async fn signing_keys(&self) -> Result<Arc<SigningKeys>, AuthError> {
        self.keys
            .try_get_with((), self.fetch_signing_keys())
            .await
            .map_err(|e: Arc<AuthError>| AuthError::KeyFetch(e.to_string()))
    }

    async fn fetch_signing_keys(&self) -> Result<Arc<SigningKeys>, AuthError> {
        tracing::debug!("Fetching signing keys from {}", self.jwks_url);

        let response = self.client.get(&self.jwks_url).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!("status {}", response.status())));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        tracing::info!("Loaded {} signing keys", set.keys.len());
        Ok(Arc::new(SigningKeys {
            set,
            fetched_at: Instant::now(),
        }))
    }
}
