//! `define_cota_nft_kv_pairs`: one row per CoTA class, written once by
//! Define and then re-upserted by every Mint to bump `issued`.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone, FromRow)]
pub struct ExistingDefine {
    pub block_number: i64,
    pub total: i64,
    pub issued: i64,
    pub configure: i16,
}

pub async fn find(
    tx: &mut Transaction<'_, Postgres>,
    cota_id: &str,
) -> Result<Option<ExistingDefine>, sqlx::Error> {
    sqlx::query_as::<_, ExistingDefine>(
        "SELECT block_number, total, issued, configure FROM define_cota_nft_kv_pairs WHERE cota_id = $1",
    )
    .bind(cota_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    total: i64,
    issued: i64,
    configure: i16,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = find(tx, cota_id).await?;
    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update } else { ActionType::Create } as i16;

    sqlx::query(
        "INSERT INTO define_cota_nft_kv_pairs (block_number, cota_id, cota_id_crc, total, issued, configure)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (cota_id) DO UPDATE SET
            block_number = $1, total = $4, issued = $5, configure = $6",
    )
    .bind(block_number)
    .bind(cota_id)
    .bind(crc32_of(cota_id))
    .bind(total)
    .bind(issued)
    .bind(configure)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO define_cota_nft_kv_pair_versions
            (old_block_number, block_number, cota_id, old_total, total, old_issued, issued,
             configure, action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(cota_id)
    .bind(existing.as_ref().map(|e| e.total))
    .bind(total)
    .bind(existing.as_ref().map(|e| e.issued))
    .bind(issued)
    .bind(configure)
    .bind(action_type)
    .bind(tx_index)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Bumps `issued` by one for a Mint, reusing the row's existing `total`/
/// `configure`. Returns an invariant error (mapped by the caller) if the
/// class was never defined — a Mint can't precede its Define.
pub async fn increment_issued(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    tx_index: i64,
) -> Result<Option<()>, sqlx::Error> {
    let Some(existing) = find(tx, cota_id).await? else {
        return Ok(None);
    };
    upsert(tx, block_number, cota_id, existing.total, existing.issued + 1, existing.configure, tx_index).await?;
    Ok(Some(()))
}

pub async fn delete_by_block(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM define_cota_nft_kv_pairs WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM define_cota_nft_kv_pair_versions WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
