//! Argon2 verification of the single admin identity.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use chapel_core::ports::{AuthError, CredentialVerifier};

/// Verifies login attempts against one configured username and an Argon2 PHC hash.
///
/// When built from a plaintext password the hash is computed once at startup, so the
/// plaintext is never kept in memory past construction.
pub struct Argon2AdminVerifier {
    argon2: Argon2<'static>,
    admin: Option<(String, String)>,
}

impl Argon2AdminVerifier {
    /// Use a precomputed PHC string (`$argon2id$v=19$...`).
    pub fn from_hash(username: impl Into<String>, hash: &str) -> Result<Self, AuthError> {
        PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::default(),
            admin: Some((username.into(), hash.to_string())),
        })
    }

    /// Hash a plaintext password.
    pub fn from_plaintext(username: impl Into<String>, password: &str) -> Result<Self, AuthError> {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?
            .to_string();

        Ok(Self {
            argon2,
            admin: Some((username.into(), hash)),
        })
    }

    /// A verifier that rejects every login, for deployments without admin credentials.
    pub fn disabled() -> Self {
        Self {
            argon2: Argon2::default(),
            admin: None,
        }
    }
}

#[async_trait]
impl CredentialVerifier for Argon2AdminVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let Some((admin_username, hash)) = &self.admin else {
            return Ok(false);
        };

        // Argon2 is CPU-bound for tens of milliseconds; run it on the blocking pool.
        let argon2 = self.argon2.clone();
        let hash = hash.clone();
        let password = password.to_owned();
        let password_ok = tokio::task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
            Ok::<_, AuthError>(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|e| AuthError::HashingError(format!("verification task failed: {e}")))??;

        // The hash always runs, so a wrong username costs as much as a wrong password.
        Ok(password_ok && username == admin_username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plaintext_credentials() {
        let verifier = Argon2AdminVerifier::from_plaintext("admin", "secure_password_123").unwrap();

        assert!(verifier.verify("admin", "secure_password_123").await.unwrap());
        assert!(!verifier.verify("admin", "wrong_password").await.unwrap());
        assert!(!verifier.verify("root", "secure_password_123").await.unwrap());
    }

    #[tokio::test]
    async fn test_precomputed_hash() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"pw", &salt)
            .unwrap()
            .to_string();

        let verifier = Argon2AdminVerifier::from_hash("admin", &hash).unwrap();

        assert!(verifier.verify("admin", "pw").await.unwrap());
    }

    #[test]
    fn test_malformed_hash_rejected_at_startup() {
        let result = Argon2AdminVerifier::from_hash("admin", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::HashingError(_))));
    }

    #[tokio::test]
    async fn test_disabled_rejects_everything() {
        let verifier = Argon2AdminVerifier::disabled();
        assert!(!verifier.verify("", "").await.unwrap());
        assert!(!verifier.verify("admin", "admin").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_verification_leaves_runtime_free() {
        let verifier = std::sync::Arc::new(
            Argon2AdminVerifier::from_plaintext("admin", "secure_password_123").unwrap(),
        );
        let ticks = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        assert!(verifier.verify("admin", "secure_password_123").await.unwrap());
        ticker.abort();

        // On a single-threaded runtime the ticker only runs while the hash is elsewhere.
        assert!(ticks.load(std::sync::atomic::Ordering::SeqCst) > 0);
    }
}
