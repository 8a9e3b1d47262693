//! Background cleanup task for old tokens.
//!
//! Off by default: tokens normally live until their code is reused.

use crate::config::CleanupConfig;
use crate::limits::RateLimits;
use crate::storage::TokenStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Run one cleanup pass.
///
/// Returns the number of tokens deleted.
pub async fn run_once(
    storage: &dyn TokenStorage,
    rate_limits: &RateLimits,
    max_age_secs: u64,
) -> u64 {
    rate_limits.shrink();

    match storage.cleanup_older_than(max_age_secs).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!("Cleanup: deleted {} expired tokens", deleted);
            } else {
                tracing::debug!("Cleanup: no expired tokens");
            }
            deleted
        }
        Err(e) => {
            tracing::error!("Cleanup error: {}", e);
            0
        }
    }
}

/// Spawn a background cleanup task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_task(
    storage: Arc<dyn TokenStorage>,
    rate_limits: RateLimits,
    config: CleanupConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("Cleanup task disabled");
            return;
        }

        tracing::info!(
            "Cleanup task started (interval: {}s, max age: {}s)",
            config.interval_secs,
            config.max_age_secs
        );

        let mut timer = interval(Duration::from_secs(config.interval_secs));

        loop {
            timer.tick().await;
            run_once(storage.as_ref(), &rate_limits, config.max_age_secs).await;
        }
    })
}
