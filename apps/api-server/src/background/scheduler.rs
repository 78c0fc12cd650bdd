//! Periodic maintenance on tokio-cron-scheduler.

#[cfg(feature = "scheduler")]
use std::sync::Arc;

use chapel_core::ports::SessionStore;

#[cfg(feature = "scheduler")]
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    pub purge_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            purge_cron: "0 0 * * * *".to_string(),
        }
    }
}

/// One purge pass. Failures are logged and retried on the next tick.
pub async fn purge_expired_sessions(store: &dyn SessionStore) -> Option<u64> {
    match store.purge_expired().await {
        Ok(0) => {
            tracing::debug!("No expired sessions to purge");
            Some(0)
        }
        Ok(removed) => {
            tracing::info!(removed, "Purged expired sessions");
            Some(removed)
        }
        Err(e) => {
            tracing::error!(error = %e, "Session purge failed");
            None
        }
    }
}

/// Running purge job. Dropping it does not stop the job; call [`SessionPurge::shutdown`].
#[cfg(feature = "scheduler")]
pub struct SessionPurge {
    scheduler: JobScheduler,
    job_id: uuid::Uuid,
}

#[cfg(feature = "scheduler")]
impl SessionPurge {
    pub async fn shutdown(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.remove(&self.job_id).await?;
        self.scheduler.shutdown().await?;
        tracing::info!("Session purge stopped");
        Ok(())
    }
}

/// Register the expired-session purge and start ticking. `None` when disabled.
#[cfg(feature = "scheduler")]
pub async fn start_session_purge(
    store: Arc<dyn SessionStore>,
    config: SchedulerConfig,
) -> Result<Option<SessionPurge>, JobSchedulerError> {
    if !config.enabled {
        tracing::info!("Scheduler disabled; expired sessions are not purged");
        return Ok(None);
    }

    let scheduler = JobScheduler::new().await?;
    let job = Job::new_async(config.purge_cron.as_str(), move |_uuid, _lock| {
        let store = store.clone();
        Box::pin(async move {
            purge_expired_sessions(store.as_ref()).await;
        })
    })?;

    let job_id = scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(schedule = %config.purge_cron, job_id = %job_id, "Session purge scheduled");

    Ok(Some(SessionPurge { scheduler, job_id }))
}
