//! The sync cursor: `(check_type, block_number, block_hash)`, one row per
//! check_type, advanced atomically alongside the block's derived rows in
//! the same transaction.

use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::CheckInfo;

pub async fn get(pool: &PgPool, check_type: i16) -> Result<Option<CheckInfo>, sqlx::Error> {
    sqlx::query_as::<_, CheckInfo>(
        "SELECT id, check_type, block_number, block_hash, created_at, updated_at
         FROM check_infos WHERE check_type = $1",
    )
    .bind(check_type)
    .fetch_optional(pool)
    .await
}

/// Inserts the first cursor row for a check_type, or advances the existing
/// one. Must run inside the same transaction as the block's derived-row
/// writes so a crash between the two never leaves them inconsistent.
pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    check_type: i16,
    block_number: i64,
    block_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO check_infos (check_type, block_number, block_hash, updated_at)
         VALUES ($1, $2, $3, now())
         ON CONFLICT (check_type) DO UPDATE
         SET block_number = $2, block_hash = $3, updated_at = now()",
    )
    .bind(check_type)
    .bind(block_number)
    .bind(block_hash)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rollback Engine entry point: rewinds the cursor to a specific past
/// height without touching derived rows.
pub async fn rewind(
    tx: &mut Transaction<'_, Postgres>,
    check_type: i16,
    block_number: i64,
    block_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE check_infos SET block_number = $2, block_hash = $3, updated_at = now()
         WHERE check_type = $1",
    )
    .bind(check_type)
    .bind(block_number)
    .bind(block_hash)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// CheckInfo Cleaner: deletes every row for a check_type except the most
/// recently updated one. The caller drives this under a
/// `CancellationToken`-aware interval so the loop actually stops on
/// shutdown.
pub async fn delete_stale(pool: &PgPool, check_type: i16) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM check_infos
         WHERE check_type = $1
           AND id NOT IN (
               SELECT id FROM check_infos WHERE check_type = $1
               ORDER BY updated_at DESC LIMIT 1
           )",
    )
    .bind(check_type)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
