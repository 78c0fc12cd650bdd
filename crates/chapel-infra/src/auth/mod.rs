//! Authentication implementations.

mod admin;

pub use admin::Argon2AdminVerifier;
