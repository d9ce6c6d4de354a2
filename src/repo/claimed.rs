//! `claimed_cota_nft_kv_pairs`: one row per withdrawal the receiver has
//! claimed back into their own Hold set, written by Transfer,
//! TransferUpdate and the standalone Claim operation.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone, FromRow)]
struct ExistingClaimed {
    block_number: i64,
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    token_index: i64,
    out_point: &str,
    lock_hash: &str,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, ExistingClaimed>(
        "SELECT block_number FROM claimed_cota_nft_kv_pairs
         WHERE cota_id = $1 AND token_index = $2 AND lock_hash = $3",
    )
    .bind(cota_id)
    .bind(token_index)
    .bind(lock_hash)
    .fetch_optional(&mut **tx)
    .await?;
    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update } else { ActionType::Create } as i16;

    sqlx::query(
        "INSERT INTO claimed_cota_nft_kv_pairs
            (block_number, cota_id, cota_id_crc, token_index, out_point,
             out_point_crc, lock_hash, lock_hash_crc)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (cota_id, token_index, lock_hash) DO UPDATE SET block_number = $1",
    )
    .bind(block_number)
    .bind(cota_id)
    .bind(crc32_of(cota_id))
    .bind(token_index)
    .bind(out_point)
    .bind(crc32_of(out_point))
    .bind(lock_hash)
    .bind(crc32_of(lock_hash))
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO claimed_cota_nft_kv_pair_versions
            (old_block_number, block_number, cota_id, token_index, out_point,
             lock_hash, action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(cota_id)
    .bind(token_index)
    .bind(out_point)
    .bind(lock_hash)
    .bind(action_type)
    .bind(tx_index)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_by_block(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM claimed_cota_nft_kv_pairs WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM claimed_cota_nft_kv_pair_versions WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
