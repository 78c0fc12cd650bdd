//! Services - the operations the HTTP layer calls, written against the ports.

mod posts;
mod session_authority;

pub use posts::PostService;
pub use session_authority::SessionAuthority;
