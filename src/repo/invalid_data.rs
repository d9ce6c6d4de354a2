//! `invalid_data`: one row per entry the Codec Adapters couldn't decode.
//! The Block Syncer records these and keeps going rather than failing the
//! whole block.

use sqlx::{Postgres, Transaction};

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    tx_index: i64,
    reason: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO invalid_data (block_number, tx_index, reason) VALUES ($1, $2, $3)")
        .bind(block_number)
        .bind(tx_index)
        .bind(reason)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn delete_by_block(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invalid_data WHERE block_number > $1")
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
