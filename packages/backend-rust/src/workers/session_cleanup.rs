use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::services::sessions::SessionStore;

#[derive(Debug, Default)]
struct CleanupStats {
    expired_sessions: usize,
    remaining_sessions: usize,
    duration_secs: f64,
}

pub async fn cleanup_expired_sessions(store: Arc<SessionStore>) {
    let start = Instant::now();
    debug!("Starting session cleanup cycle");

    let mut stats = CleanupStats::default();
    stats.expired_sessions = store.prune_expired().await;
    stats.remaining_sessions = store.len().await;
    stats.duration_secs = start.elapsed().as_secs_f64();

    if stats.expired_sessions > 0 {
        info!(
            expired_sessions = stats.expired_sessions,
            remaining_sessions = stats.remaining_sessions,
            duration_secs = format!("{:.2}", stats.duration_secs),
            "Session cleanup completed"
        );
    }
}
