//! Domain entities - the core business objects.

mod post;
mod session;

pub use post::{NewPost, Post, PostDraft, PostSummary, TITLE_MAX_CHARS};
pub use session::{Session, SessionGrant, SessionToken};
