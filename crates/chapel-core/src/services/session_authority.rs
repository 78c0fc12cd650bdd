use std::sync::Arc;

use chrono::TimeDelta;

use crate::domain::{Session, SessionGrant, SessionToken};
use crate::ports::{AuthError, CredentialVerifier, SessionStore};

/// Issues and checks admin sessions.
///
/// There is exactly one admin identity; a session either carries `is_admin` or grants
/// nothing. Store failures surface as [`AuthError::Store`] and are never folded into
/// "not authenticated".
#[derive(Clone)]
pub struct SessionAuthority {
    store: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    ttl: TimeDelta,
}

impl SessionAuthority {
    pub fn new(
        store: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            store,
            verifier,
            ttl,
        }
    }

    /// Lifetime of a freshly issued session.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Verify credentials and persist a new admin session.
    ///
    /// A fresh token is always issued; the caller's previous session, if any, is
    /// destroyed. The new session is written before this returns, so a check on the
    /// returned token immediately observes it.
    pub async fn login(
        &self,
        current: Option<&SessionToken>,
        username: &str,
        password: &str,
    ) -> Result<SessionGrant, AuthError> {
        if !self.verifier.verify(username, password).await? {
            tracing::warn!("Admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(previous) = current {
            self.store.destroy(previous).await?;
        }

        let session = Session::admin(self.ttl);
        self.store.set(&session).await?;
        tracing::info!(session = session.token.redacted(), "Admin logged in");

        Ok(SessionGrant {
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    /// Destroy the caller's session. A missing or unknown token is a no-op.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<(), AuthError> {
        if let Some(token) = token {
            self.store.destroy(token).await?;
            tracing::info!(session = token.redacted(), "Session destroyed");
        }
        Ok(())
    }

    /// Whether the caller holds a live admin session.
    pub async fn check(&self, token: Option<&SessionToken>) -> Result<bool, AuthError> {
        match self.require_admin(token).await {
            Ok(_) => Ok(true),
            Err(AuthError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Gate for mutating operations. Fails closed on anything but a live admin session.
    pub async fn require_admin(&self, token: Option<&SessionToken>) -> Result<Session, AuthError> {
        let token = token.ok_or(AuthError::Unauthorized)?;

        match self.store.get(token).await? {
            Some(session) if session.is_admin && !session.is_expired() => Ok(session),
            _ => Err(AuthError::Unauthorized),
        }
    }
}
