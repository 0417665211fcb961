// Service exports
pub mod auth;
pub mod cache;
pub mod firebase;
pub mod notifier;

pub use auth::{AuthError, AuthSession, IdTokenClaims, IdentityClient, TokenVerifier};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use firebase::{Collections, FirebaseClient, FirebaseError};
