//! `scripts`: the receiver lock script a withdrawal targets, deduplicated
//! by `(code_hash, hash_type, args)` before writing
//! `WithdrawCotaNftKvPair.receiver_lock_script_id`.

use sqlx::{Postgres, Transaction};

use crate::hashutil::crc32_of;

pub async fn find_or_create(
    tx: &mut Transaction<'_, Postgres>,
    code_hash: &str,
    hash_type: &str,
    args: &str,
) -> Result<i64, sqlx::Error> {
    if let Some(row) = sqlx::query_as::<_, (i64,)>(
        "SELECT id FROM scripts WHERE code_hash = $1 AND hash_type = $2 AND args = $3",
    )
    .bind(code_hash)
    .bind(hash_type)
    .bind(args)
    .fetch_optional(&mut **tx)
    .await?
    {
        return Ok(row.0);
    }

    let row: (i64,) = sqlx::query_as(
        "INSERT INTO scripts (code_hash, code_hash_crc, hash_type, args, args_crc)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (code_hash, hash_type, args) DO UPDATE SET code_hash = EXCLUDED.code_hash
         RETURNING id",
    )
    .bind(code_hash)
    .bind(crc32_of(code_hash))
    .bind(hash_type)
    .bind(args)
    .bind(crc32_of(args))
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.0)
}
