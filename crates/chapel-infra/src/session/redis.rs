//! Redis session store with connection manager and native key expiry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use chapel_core::domain::{Session, SessionToken};
use chapel_core::ports::{SessionStore, SessionStoreError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix prepended to every session key
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "chapel:session:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            key_prefix: std::env::var("REDIS_SESSION_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

/// Redis-backed session store. Keys carry a TTL matching the session expiry, so Redis
/// drops expired sessions on its own.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisSessionStore {
    pub async fn new(config: RedisConfig) -> Result<Self, SessionStoreError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| SessionStoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| SessionStoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| SessionStoreError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis session store");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix,
        })
    }

    fn key(&self, token: &SessionToken) -> String {
        format!("{}{}", self.key_prefix, token.as_str())
    }
}

fn op_err(err: redis::RedisError) -> SessionStoreError {
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
        SessionStoreError::Connection(err.to_string())
    } else {
        SessionStoreError::Operation(err.to_string())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<Session>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(token)).await.map_err(op_err)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let session: Session = serde_json::from_str(&raw)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        if session.token != *token || session.is_expired() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        let remaining = (session.expires_at - Utc::now()).num_seconds();
        if remaining <= 0 {
            return self.destroy(&session.token).await;
        }

        let payload = serde_json::to_string(session)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.key(&session.token), payload, remaining as u64)
            .await
            .map_err(op_err)?;
        Ok(())
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(token)).await.map_err(op_err)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        // Redis expires keys itself.
        Ok(0)
    }
}
