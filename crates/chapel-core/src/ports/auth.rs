//! Authentication and authorization ports.

use async_trait::async_trait;

use crate::ports::SessionStoreError;

/// Checks a username/password pair against the configured admin identity.
///
/// Implementations doing CPU-heavy hashing must keep it off the async worker threads.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` on mismatch; `Err` only when verification itself failed.
    async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Session store unavailable: {0}")]
    Store(#[from] SessionStoreError),
}
