//! Watchdog for generations stuck in `processing`.
//!
//! The pipeline task owns its record, but a crashed or killed process
//! leaves the record `processing` forever with nothing to finish it. This
//! sweeper fails any processing generation whose last write is older than
//! the configured threshold, using the same status-guarded transition the
//! pipeline uses, so a still-running task that finishes late simply loses
//! the race and its final write affects zero rows.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use shipnotes_db::repositories::GenerationRepo;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the stale-generation sweep loop.
///
/// `stale_after_mins` comes from `ServerConfig::stale_generation_mins`;
/// a value of 0 disables the watchdog entirely. Runs until `cancel` is
/// triggered.
pub async fn run(pool: PgPool, stale_after_mins: i64, cancel: CancellationToken) {
    if stale_after_mins <= 0 {
        tracing::info!("Stale-generation watchdog disabled");
        return;
    }

    tracing::info!(
        stale_after_mins,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Stale-generation watchdog started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale-generation watchdog stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::minutes(stale_after_mins);
                match GenerationRepo::fail_stale(&pool, cutoff).await {
                    Ok(swept) => {
                        if swept > 0 {
                            tracing::warn!(swept, "Stale generations marked failed");
                        } else {
                            tracing::debug!("No stale generations found");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Stale-generation sweep failed");
                    }
                }
            }
        }
    }
}
