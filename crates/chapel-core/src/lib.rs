//! # Chapel Core
//!
//! The domain layer of the Chapel posts API.
//! This crate contains the post and session rules with zero infrastructure dependencies:
//! storage, password hashing and file storage are reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{PostService, SessionAuthority};
