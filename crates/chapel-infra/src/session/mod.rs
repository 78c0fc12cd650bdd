//! Session store implementations - Redis and in-memory fallback.
//!
//! The PostgreSQL store lives next to the other SeaORM code in
//! [`database`](crate::database).

mod memory;

pub use memory::InMemorySessionStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisSessionStore};
