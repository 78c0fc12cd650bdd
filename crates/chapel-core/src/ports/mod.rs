//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod file_store;
mod repository;
mod session;

pub use auth::{AuthError, CredentialVerifier};
pub use file_store::{FileStore, StorageError};
pub use repository::PostRepository;
pub use session::{SessionStore, SessionStoreError};
