//! Periodic purge of finished rides.
//!
//! Spawns a loop that deletes rides sitting in a terminal state
//! (`completed` or `cancelled`) longer than the configured retention
//! window. Runs on a fixed interval using `tokio::time::interval`,
//! independently of any request handling -- it reclaims storage and has
//! no effect on the state machine. Non-terminal rides are never touched,
//! regardless of age.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tagalong_db::repositories::RideRepo;
use tokio_util::sync::CancellationToken;

/// How often the retention sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the ride retention loop.
///
/// Deletes terminal rides whose `updated_at` is older than
/// `retention_hours`. Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Ride retention job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Ride retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
                match RideRepo::delete_terminal_older_than(&pool, cutoff).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Ride retention: purged finished rides");
                        } else {
                            tracing::debug!("Ride retention: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Ride retention: sweep failed");
                    }
                }
            }
        }
    }
}
