//! Session persistence port.

use async_trait::async_trait;

use crate::domain::{Session, SessionToken};

/// Durable session storage keyed by the opaque cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session. Expired sessions are reported as absent.
    async fn get(&self, token: &SessionToken) -> Result<Option<Session>, SessionStoreError>;

    /// Insert or overwrite a session. Returns once the write is durable.
    async fn set(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Remove a session. Unknown tokens are not an error.
    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError>;

    /// Drop expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, SessionStoreError>;
}

/// Session store errors. Always a server-side fault, never "not authenticated".
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
