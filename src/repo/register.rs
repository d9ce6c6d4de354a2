//! `register_cota_kv_pairs`: one row per lock hash that has registered for
//! CoTA, grounded on `internal/data/register_cota_kv_pair.go`.

use sqlx::{Postgres, Transaction};

use crate::hashutil::crc32_of;

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    lock_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO register_cota_kv_pairs (block_number, lock_hash, lock_hash_crc)
         VALUES ($1, $2, $3)
         ON CONFLICT (lock_hash) DO NOTHING",
    )
    .bind(block_number)
    .bind(lock_hash)
    .bind(crc32_of(lock_hash))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_by_block(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM register_cota_kv_pairs WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
