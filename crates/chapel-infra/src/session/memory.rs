//! In-memory session store - for development without a database and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chapel_core::domain::{Session, SessionToken};
use chapel_core::ports::{SessionStore, SessionStoreError};

/// Session store using a HashMap with async RwLock.
///
/// Note: Sessions are lost on process restart and are not shared between instances.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<Session>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(token) else {
            return Ok(None);
        };

        if session.is_expired() {
            drop(sessions);
            self.sessions.write().await.remove(token);
            return Ok(None);
        }

        Ok(Some(session.clone()))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}
