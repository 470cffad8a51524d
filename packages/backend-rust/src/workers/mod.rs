mod session_cleanup;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::config::{env_bool, env_string};
use crate::services::sessions::SessionStore;

pub use session_cleanup::cleanup_expired_sessions;

const DEFAULT_SESSION_CLEANUP_SCHEDULE: &str = "0 * * * * *";

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    sessions: Arc<SessionStore>,
}

impl WorkerManager {
    pub async fn new(sessions: Arc<SessionStore>) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await.map_err(WorkerError::Scheduler)?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            sessions,
        })
    }

    pub async fn start(&self) -> Result<(), WorkerError> {
        let enable_session_cleanup = env_bool("ENABLE_SESSION_CLEANUP_WORKER").unwrap_or(true);

        let scheduler = self.scheduler.lock().await;

        if enable_session_cleanup {
            let schedule = env_string("SESSION_CLEANUP_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_SESSION_CLEANUP_SCHEDULE.to_string());
            let sessions = Arc::clone(&self.sessions);
            let shutdown_rx = self.shutdown_tx.subscribe();
            let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
                let sessions = Arc::clone(&sessions);
                let mut rx = shutdown_rx.resubscribe();
                Box::pin(async move {
                    tokio::select! {
                        _ = rx.recv() => {},
                        _ = session_cleanup::cleanup_expired_sessions(sessions) => {}
                    }
                })
            })
            .map_err(WorkerError::Scheduler)?;
            scheduler.add(job).await.map_err(WorkerError::Scheduler)?;
            info!(schedule = %schedule, "Session cleanup worker scheduled");
        } else {
            info!("Session cleanup worker disabled");
        }

        scheduler.start().await.map_err(WorkerError::Scheduler)?;
        info!("All workers started");

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }

        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}
