//! CheckInfo Cleaner: periodic sweep that deletes every stale cursor row,
//! keeping only the most recent one per check_type, via a `tokio::select!`
//! between the cancellation token and the tick timer so the loop actually
//! exits on shutdown.

use sqlx::PgPool;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::db::models::CHECK_TYPE_SYNC;

pub struct CheckInfoCleaner {
    pool: PgPool,
    interval: Duration,
    cancel: CancellationToken,
}

impl CheckInfoCleaner {
    pub fn new(pool: PgPool, interval_secs: u64, cancel: CancellationToken) -> Self {
        Self { pool, interval: Duration::from_secs(interval_secs), cancel }
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.interval);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("check_info cleaner stopping");
                    return;
                }
                _ = ticker.tick() => {
                    match crate::repo::check_info::delete_stale(&self.pool, CHECK_TYPE_SYNC).await {
                        Ok(deleted) if deleted > 0 => info!(deleted, "cleaned up stale check_info rows"),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "check_info cleanup failed"),
                    }
                }
            }
        }
    }
}
