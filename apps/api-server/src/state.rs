//! Application state - shared across all handlers.

use std::sync::Arc;

use chapel_core::ports::{CredentialVerifier, FileStore, PostRepository, SessionStore};
use chapel_core::{PostService, SessionAuthority};
use chapel_infra::{
    Argon2AdminVerifier, InMemoryPostRepository, InMemorySessionStore, LocalFileStore,
};
use chrono::TimeDelta;

#[cfg(feature = "postgres")]
use chapel_infra::{PostgresPostRepository, PostgresSessionStore, database::connect};
#[cfg(feature = "redis")]
use chapel_infra::{RedisConfig, RedisSessionStore};

use crate::config::{AdminConfig, AppConfig, SessionConfig, SessionStoreKind, UploadConfig};

/// Fatal problems while wiring the application together.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Database: {0}")]
    Database(String),

    #[error("Migration: {0}")]
    Migration(String),

    #[error("Session store: {0}")]
    SessionStore(String),

    #[error("Admin credentials: {0}")]
    Credentials(String),

    #[error("{0}")]
    Unsupported(&'static str),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub auth: SessionAuthority,
    pub session_store: Arc<dyn SessionStore>,
    pub files: Arc<dyn FileStore>,
    pub session_cookie: SessionConfig,
    pub upload: UploadConfig,
}

impl AppState {
    /// Assemble state from already-built adapters.
    pub fn from_parts(
        repo: Arc<dyn PostRepository>,
        session_store: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        files: Arc<dyn FileStore>,
        session_cookie: SessionConfig,
        upload: UploadConfig,
    ) -> Self {
        let ttl = TimeDelta::hours(session_cookie.ttl_hours);
        Self {
            posts: PostService::new(repo),
            auth: SessionAuthority::new(session_store.clone(), verifier, ttl),
            session_store,
            files,
            session_cookie,
            upload,
        }
    }

    /// Build the application state with the adapters selected by `config`.
    ///
    /// Without `DATABASE_URL` posts and sessions live in memory and vanish on restart.
    /// With it, a connection or migration failure aborts startup.
    pub async fn build(config: &AppConfig) -> Result<Self, StartupError> {
        #[cfg(feature = "postgres")]
        let db = match &config.database {
            Some(db_config) => {
                let db = connect(db_config)
                    .await
                    .map_err(|e| StartupError::Database(e.to_string()))?;
                if config.run_migrations {
                    use migration::MigratorTrait;
                    migration::Migrator::up(&db, None)
                        .await
                        .map_err(|e| StartupError::Migration(e.to_string()))?;
                    tracing::info!("Migrations applied");
                }
                Some(Arc::new(db))
            }
            None => None,
        };

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            return Err(StartupError::Unsupported(
                "DATABASE_URL is set but the server was built without the postgres feature",
            ));
        }

        #[cfg(feature = "postgres")]
        let repo: Arc<dyn PostRepository> = match &db {
            Some(db) => Arc::new(PostgresPostRepository::new(db.clone())),
            None => in_memory_posts(),
        };
        #[cfg(not(feature = "postgres"))]
        let repo = in_memory_posts();

        let session_store: Arc<dyn SessionStore> = match config.session.store {
            SessionStoreKind::Memory => {
                tracing::warn!("Sessions are kept in memory; logins are lost on restart");
                Arc::new(InMemorySessionStore::new())
            }
            #[cfg(feature = "postgres")]
            SessionStoreKind::Postgres => match &db {
                Some(db) => Arc::new(PostgresSessionStore::new(db.clone())),
                None => {
                    return Err(StartupError::SessionStore(
                        "SESSION_STORE=postgres requires DATABASE_URL".to_string(),
                    ));
                }
            },
            #[cfg(feature = "redis")]
            SessionStoreKind::Redis => Arc::new(
                RedisSessionStore::new(RedisConfig::from_env())
                    .await
                    .map_err(|e| StartupError::SessionStore(e.to_string()))?,
            ),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(StartupError::Unsupported(
                    "The configured session store is not compiled into this build",
                ));
            }
        };

        let verifier = admin_verifier(&config.admin)?;
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
            config.upload.dir.clone(),
            config.upload.public_base_url.clone(),
        ));

        tracing::info!(
            session_store = ?config.session.store,
            ttl_hours = config.session.ttl_hours,
            "Application state initialized"
        );

        Ok(Self::from_parts(
            repo,
            session_store,
            verifier,
            files,
            config.session.clone(),
            config.upload.clone(),
        ))
    }
}

fn in_memory_posts() -> Arc<dyn PostRepository> {
    tracing::warn!("DATABASE_URL not set. Posts are kept in memory.");
    Arc::new(InMemoryPostRepository::new())
}

/// Missing credentials leave the server read-only rather than refusing to start.
fn admin_verifier(admin: &AdminConfig) -> Result<Arc<dyn CredentialVerifier>, StartupError> {
    let Some(username) = &admin.username else {
        tracing::error!("ADMIN_USERNAME not set; admin login is disabled");
        return Ok(Arc::new(Argon2AdminVerifier::disabled()));
    };

    let verifier = match (&admin.password_hash, &admin.password) {
        (Some(hash), _) => Argon2AdminVerifier::from_hash(username.clone(), hash),
        (None, Some(password)) => {
            tracing::warn!("Using plaintext ADMIN_PASSWORD; prefer ADMIN_PASSWORD_HASH");
            Argon2AdminVerifier::from_plaintext(username.clone(), password)
        }
        (None, None) => {
            tracing::error!("No admin password configured; admin login is disabled");
            return Ok(Arc::new(Argon2AdminVerifier::disabled()));
        }
    };

    verifier
        .map(|v| Arc::new(v) as Arc<dyn CredentialVerifier>)
        .map_err(|e| StartupError::Credentials(e.to_string()))
}
