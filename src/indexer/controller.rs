//! Sync Controller: the outer loop — poll the tip, fetch the next block,
//! detect forks, sync or roll back, repeat. Built around a `ChainSync::start`-
//! style poll loop (`sleep` + re-check tip height) expressed as a
//! `tokio::select!`/`CancellationToken` shape in place of a goroutine and a
//! `context.Done()` channel.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::db::models::CHECK_TYPE_SYNC;
use crate::error::SyncError;
use crate::repo::check_info;
use crate::rpc::CkbRpcClient;

use super::rollback;
use super::syncer;

pub struct SyncController {
    pool: PgPool,
    rpc: Arc<dyn CkbRpcClient>,
    poll_interval: Duration,
    fast_mode: bool,
    cancel: CancellationToken,
}

impl SyncController {
    pub fn new(pool: PgPool, rpc: Arc<dyn CkbRpcClient>, mode: &str, poll_interval_secs: u64, cancel: CancellationToken) -> Self {
        Self {
            pool,
            rpc,
            poll_interval: Duration::from_secs(poll_interval_secs),
            fast_mode: mode == "fast",
            cancel,
        }
    }

    /// Runs until cancelled. Never returns `Err` for transient RPC/store
    /// failures — those are logged and retried next tick; only an
    /// irrecoverable invariant violation propagates up.
    pub async fn run(&self) -> Result<(), SyncError> {
        loop {
            if self.cancel.is_cancelled() {
                info!("sync controller stopping");
                return Ok(());
            }

            match self.tick().await {
                Ok(true) => continue, // synced a block, check for more immediately
                Ok(false) => {}       // caught up, wait for the next poll
                Err(e) => warn!(error = %e, "sync tick failed, will retry"),
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("sync controller stopping");
                    return Ok(());
                }
                _ = sleep(self.sleep_duration()) => {}
            }
        }
    }

    fn sleep_duration(&self) -> Duration {
        if self.fast_mode {
            Duration::from_millis(200)
        } else {
            self.poll_interval
        }
    }

    /// Returns `Ok(true)` if a block was synced this tick, `Ok(false)` if
    /// the indexer is caught up with the chain tip.
    async fn tick(&self) -> Result<bool, SyncError> {
        let tip = self.rpc.get_tip_block_number().await.map_err(SyncError::Rpc)?;

        let cursor = check_info::get(&self.pool, CHECK_TYPE_SYNC).await?;
        let next_height = cursor.as_ref().map(|c| c.block_number as u64 + 1).unwrap_or(0);

        if next_height > tip {
            return Ok(false);
        }

        let Some(block) = self.rpc.get_block_by_number(next_height).await.map_err(SyncError::Rpc)? else {
            return Ok(false);
        };

        if let Some(cursor) = &cursor {
            if block.header.parent_hash.trim_start_matches("0x") != cursor.block_hash {
                warn!(
                    height = next_height,
                    expected_parent = %cursor.block_hash,
                    got_parent = %block.header.parent_hash,
                    "fork detected, rolling back"
                );
                rollback::rollback_to(&self.pool, cursor.block_number, &cursor.block_hash).await?;
                return Ok(true);
            }
        }

        syncer::sync_block(&self.pool, &block).await?;
        Ok(true)
    }
}
