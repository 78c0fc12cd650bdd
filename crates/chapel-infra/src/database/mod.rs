//! Database connection management and post/session persistence.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod post_repo;
#[cfg(feature = "postgres")]
mod session_store;

pub use connections::DatabaseConfig;
pub use memory::InMemoryPostRepository;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use post_repo::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use session_store::PostgresSessionStore;
