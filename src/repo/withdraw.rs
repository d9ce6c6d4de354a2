//! `withdraw_cota_nft_kv_pairs`: one row per withdrawal leaf — a token in
//! flight to a receiver lock, written by Mint, Transfer and TransferUpdate.
//! Keyed on `(cota_id, token_index, out_point)`: the same token can be
//! withdrawn more than once across its lifetime as it passes through
//! multiple transfers.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone, FromRow)]
struct ExistingWithdraw {
    block_number: i64,
    state: i16,
    characteristic: String,
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    token_index: i64,
    out_point: &str,
    state: i16,
    configure: i16,
    characteristic: &str,
    receiver_lock_script_id: i64,
    lock_hash: &str,
    version: i16,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, ExistingWithdraw>(
        "SELECT block_number, state, characteristic FROM withdraw_cota_nft_kv_pairs
         WHERE cota_id = $1 AND token_index = $2 AND out_point = $3",
    )
    .bind(cota_id)
    .bind(token_index)
    .bind(out_point)
    .fetch_optional(&mut **tx)
    .await?;

    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update } else { ActionType::Create } as i16;

    sqlx::query(
        "INSERT INTO withdraw_cota_nft_kv_pairs
            (block_number, cota_id, cota_id_crc, token_index, out_point, out_point_crc,
             state, configure, characteristic, receiver_lock_script_id, lock_hash,
             lock_hash_crc, version)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         ON CONFLICT (cota_id, token_index, out_point) DO UPDATE SET
            block_number = $1, state = $7, configure = $8, characteristic = $9,
            receiver_lock_script_id = $10, lock_hash = $11, lock_hash_crc = $12, version = $13",
    )
    .bind(block_number)
    .bind(cota_id)
    .bind(crc32_of(cota_id))
    .bind(token_index)
    .bind(out_point)
    .bind(crc32_of(out_point))
    .bind(state)
    .bind(configure)
    .bind(characteristic)
    .bind(receiver_lock_script_id)
    .bind(lock_hash)
    .bind(crc32_of(lock_hash))
    .bind(version)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO withdraw_cota_nft_kv_pair_versions
            (old_block_number, block_number, cota_id, token_index, out_point,
             old_state, state, configure, old_characteristic, characteristic,
             action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(cota_id)
    .bind(token_index)
    .bind(out_point)
    .bind(existing.as_ref().map(|e| e.state))
    .bind(state)
    .bind(configure)
    .bind(existing.as_ref().map(|e| e.characteristic.clone()))
    .bind(characteristic)
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
    let result = sqlx::query("DELETE FROM withdraw_cota_nft_kv_pairs WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM withdraw_cota_nft_kv_pair_versions WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
