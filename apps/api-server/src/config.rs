//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use actix_web::cookie::SameSite;
use chapel_infra::database::DatabaseConfig;

use crate::background::SchedulerConfig;

/// Upper bound on `SESSION_TTL_HOURS`: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Deployment environment. Production tightens the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Where sessions are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStoreKind {
    Postgres,
    Redis,
    Memory,
}

/// The single admin identity.
#[derive(Clone, Default)]
pub struct AdminConfig {
    pub username: Option<String>,
    /// Argon2 PHC string; preferred over `password`.
    pub password_hash: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "***"))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Session lifetime and cookie attributes.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub store: SessionStoreKind,
    pub ttl_hours: i64,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
}

/// Image upload limits and destination.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
    pub max_bytes: usize,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub admin: AdminConfig,
    pub session: SessionConfig,
    pub allowed_origins: Vec<String>,
    pub upload: UploadConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        // Out-of-range values fall back to the default instead of wrapping.
        fn parse<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            var(key).and_then(|v| v.trim().parse().ok())
        }
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(default)
        };

        let environment = match var("APP_ENV").or_else(|| var("RUST_ENV")).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let database = var("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| {
                let defaults = DatabaseConfig::new(url);
                DatabaseConfig {
                    max_connections: parse(&var, "DB_MAX_CONNECTIONS")
                        .unwrap_or(defaults.max_connections),
                    min_connections: parse(&var, "DB_MIN_CONNECTIONS")
                        .unwrap_or(defaults.min_connections),
                    connect_timeout: parse(&var, "DB_CONNECT_TIMEOUT_SECS")
                        .map(Duration::from_secs)
                        .unwrap_or(defaults.connect_timeout),
                    ..defaults
                }
            });

        let store = match var("SESSION_STORE").map(|v| v.to_lowercase()).as_deref() {
            Some("redis") => SessionStoreKind::Redis,
            Some("memory") => SessionStoreKind::Memory,
            Some("postgres") => SessionStoreKind::Postgres,
            _ if database.is_some() => SessionStoreKind::Postgres,
            _ => SessionStoreKind::Memory,
        };

        let production = environment == Environment::Production;
        let session = SessionConfig {
            store,
            ttl_hours: parse::<i64>(&var, "SESSION_TTL_HOURS")
                .filter(|h| *h > 0)
                .map(|h| h.min(MAX_SESSION_TTL_HOURS))
                .unwrap_or(24),
            cookie_name: var("SESSION_COOKIE_NAME").unwrap_or_else(|| "chapel_sid".to_string()),
            cookie_domain: var("SESSION_COOKIE_DOMAIN").filter(|d| !d.is_empty()),
            secure: production,
            // Cross-site frontends need SameSite=None, which browsers only accept with Secure.
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Lax
            },
        };

        let allowed_origins = var("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let upload = UploadConfig {
            dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            public_base_url: var("UPLOAD_PUBLIC_BASE_URL").unwrap_or_else(|| "/uploads".to_string()),
            max_bytes: parse(&var, "UPLOAD_MAX_BYTES").unwrap_or(5 * 1024 * 1024),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&var, "PORT").unwrap_or(3000),
            environment,
            database,
            run_migrations: flag("RUN_MIGRATIONS", true),
            admin: AdminConfig {
                username: var("ADMIN_USERNAME").filter(|u| !u.is_empty()),
                password_hash: var("ADMIN_PASSWORD_HASH").filter(|h| !h.is_empty()),
                password: var("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            },
            session,
            allowed_origins,
            upload,
            scheduler: SchedulerConfig {
                enabled: flag("SCHEDULER_ENABLED", true),
                purge_cron: var("SESSION_PURGE_CRON").unwrap_or_else(|| "0 0 * * * *".to_string()),
            },
        }
    }
}
