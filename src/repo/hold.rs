//! `hold_cota_nft_kv_pairs`: one row per `(cota_id, token_index)` a lock
//! currently holds. Mutated by Mint, HoldUpdateState, HoldUpdateCharacteristic
//! and Claim; every mutation writes a matching `hold_cota_nft_kv_pair_versions`
//! row so Rollback can restore prior state.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone, FromRow)]
struct ExistingHold {
    block_number: i64,
    state: i16,
    configure: i16,
    characteristic: String,
    lock_hash: String,
}

async fn find(
    tx: &mut Transaction<'_, Postgres>,
    cota_id: &str,
    token_index: i64,
) -> Result<Option<ExistingHold>, sqlx::Error> {
    sqlx::query_as::<_, ExistingHold>(
        "SELECT block_number, state, configure, characteristic, lock_hash
         FROM hold_cota_nft_kv_pairs WHERE cota_id = $1 AND token_index = $2",
    )
    .bind(cota_id)
    .bind(token_index)
    .fetch_optional(&mut **tx)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    token_index: i64,
    state: i16,
    configure: i16,
    characteristic: &str,
    lock_hash: &str,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = find(tx, cota_id, token_index).await?;
    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update as i16 } else { ActionType::Create as i16 };

    sqlx::query(
        "INSERT INTO hold_cota_nft_kv_pairs
            (block_number, cota_id, cota_id_crc, token_index, state, configure,
             characteristic, lock_hash, lock_hash_crc)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (cota_id, token_index) DO UPDATE SET
            block_number = $1, state = $5, configure = $6,
            characteristic = $7, lock_hash = $8, lock_hash_crc = $9",
    )
    .bind(block_number)
    .bind(cota_id)
    .bind(crc32_of(cota_id))
    .bind(token_index)
    .bind(state)
    .bind(configure)
    .bind(characteristic)
    .bind(lock_hash)
    .bind(crc32_of(lock_hash))
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO hold_cota_nft_kv_pair_versions
            (old_block_number, block_number, cota_id, token_index,
             old_state, state, configure, old_characteristic, characteristic,
             old_lock_hash, lock_hash, action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(cota_id)
    .bind(token_index)
    .bind(existing.as_ref().map(|e| e.state))
    .bind(state)
    .bind(configure)
    .bind(existing.as_ref().map(|e| e.characteristic.clone()))
    .bind(characteristic)
    .bind(existing.as_ref().map(|e| e.lock_hash.clone()))
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
    let result = sqlx::query("DELETE FROM hold_cota_nft_kv_pairs WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM hold_cota_nft_kv_pair_versions WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
