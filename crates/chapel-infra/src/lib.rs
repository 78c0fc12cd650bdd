//! # Chapel Infrastructure
//!
//! Concrete implementations of the ports defined in `chapel-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL post repository and session store via SeaORM
//! - `auth` - Argon2 admin credential verification
//! - `redis` - Redis session store

pub mod database;
pub mod session;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory / local
pub use database::InMemoryPostRepository;
pub use session::InMemorySessionStore;
pub use storage::LocalFileStore;

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresSessionStore};

#[cfg(feature = "auth")]
pub use auth::Argon2AdminVerifier;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use session::{RedisConfig, RedisSessionStore};
