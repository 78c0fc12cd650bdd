//! Background jobs.

mod scheduler;

pub use scheduler::{SchedulerConfig, purge_expired_sessions};
#[cfg(feature = "scheduler")]
pub use scheduler::start_session_purge;
