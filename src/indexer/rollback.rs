//! Rollback Engine: on a detected fork, deletes every block-scoped row
//! above the rolled-back height and rewinds the cursor to it. Fork
//! detection is single-level — the cursor's own last known-good height and
//! hash are the rollback target, with no walk-back search for a deeper
//! common ancestor; the next poll re-fetches the block at that height and
//! either finds the chain agrees now or forks again, one level at a time.
//! Metadata tables (`issuer_infos`, `class_infos`) are block-scoped too, so
//! a reorg can un-write a metadata update as well as a mint — unlike the
//! other families, which are simply deleted above the rollback height,
//! these restore the prior value recorded in their `*_version` history so a
//! row that existed before the rolled-back blocks reappears as it was.

use sqlx::PgPool;

use crate::db::models::CHECK_TYPE_SYNC;
use crate::error::SyncError;
use crate::repo::{check_info, claimed, class_info, define, hold, invalid_data, issuer_info, register, withdraw};

/// Deletes every row with `block_number > height` across all derived
/// tables, restores metadata rows to their pre-rollback value, then rewinds
/// the sync cursor to `(height, hash)`. Runs in one transaction so a crash
/// mid-rollback never leaves a partially-rewound store.
pub async fn rollback_to(pool: &PgPool, height: i64, hash: &str) -> Result<(), SyncError> {
    let mut tx = pool.begin().await?;

    register::delete_by_block(&mut tx, height).await?;
    hold::delete_by_block(&mut tx, height).await?;
    withdraw::delete_by_block(&mut tx, height).await?;
    claimed::delete_by_block(&mut tx, height).await?;
    define::delete_by_block(&mut tx, height).await?;
    issuer_info::restore_from_version(&mut tx, height).await?;
    class_info::restore_from_version(&mut tx, height).await?;
    invalid_data::delete_by_block(&mut tx, height).await?;

    check_info::rewind(&mut tx, CHECK_TYPE_SYNC, height, hash).await?;

    tx.commit().await?;
    Ok(())
}
