//! `issuer_infos`: one row per lock hash's issuer metadata blob, parsed
//! from the JSON payload the block classifier hands to the Block Syncer.
//! Grounded on `internal/biz/ct_meta.go`'s `ParseIssuerInfo`.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::error::CodecError;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone)]
pub struct IssuerMetadata {
    pub version: String,
    pub name: String,
    pub avatar: String,
    pub description: String,
    pub localization: String,
}

pub fn parse(data: &serde_json::Value) -> Result<IssuerMetadata, CodecError> {
    let field = |key: &str| -> String {
        data.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
    };
    if data.get("name").is_none() {
        return Err(CodecError::MalformedJson("issuer metadata missing \"name\"".into()));
    }
    Ok(IssuerMetadata {
        version: field("version"),
        name: field("name"),
        avatar: field("avatar"),
        description: field("description"),
        localization: serde_json::to_string(data.get("localization").unwrap_or(&serde_json::Value::Null))
            .unwrap_or_default(),
    })
}

#[derive(Debug, Clone, FromRow)]
struct ExistingIssuer {
    block_number: i64,
    version: String,
    name: String,
    avatar: String,
    description: String,
    localization: String,
}

pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    lock_hash: &str,
    meta: &IssuerMetadata,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, ExistingIssuer>(
        "SELECT block_number, version, name, avatar, description, localization
         FROM issuer_infos WHERE lock_hash = $1",
    )
    .bind(lock_hash)
    .fetch_optional(&mut **tx)
    .await?;
    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update } else { ActionType::Create } as i16;

    sqlx::query(
        "INSERT INTO issuer_infos
            (block_number, lock_hash, lock_hash_crc, version, name, avatar, description, localization)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (lock_hash) DO UPDATE SET
            block_number = $1, version = $4, name = $5, avatar = $6, description = $7, localization = $8",
    )
    .bind(block_number)
    .bind(lock_hash)
    .bind(crc32_of(lock_hash))
    .bind(&meta.version)
    .bind(&meta.name)
    .bind(&meta.avatar)
    .bind(&meta.description)
    .bind(&meta.localization)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO issuer_info_versions
            (old_block_number, block_number, lock_hash, old_version, version, old_name, name,
             old_avatar, avatar, old_description, description, old_localization, localization,
             action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(lock_hash)
    .bind(existing.as_ref().map(|e| e.version.clone()))
    .bind(&meta.version)
    .bind(existing.as_ref().map(|e| e.name.clone()))
    .bind(&meta.name)
    .bind(existing.as_ref().map(|e| e.avatar.clone()))
    .bind(&meta.avatar)
    .bind(existing.as_ref().map(|e| e.description.clone()))
    .bind(&meta.description)
    .bind(existing.as_ref().map(|e| e.localization.clone()))
    .bind(&meta.localization)
    .bind(action_type)
    .bind(tx_index)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[derive(Debug, Clone, FromRow)]
struct FirstVersionAboveHeight {
    lock_hash: String,
    old_block_number: i64,
    old_version: Option<String>,
    old_name: Option<String>,
    old_avatar: Option<String>,
    old_description: Option<String>,
    old_localization: Option<String>,
    action_type: i16,
}

/// Undoes every mutation recorded above `height`: for each lock hash, the
/// earliest `issuer_info_versions` row above `height` carries the value the
/// row held just before the rollback horizon. A `Create` row means the row
/// didn't exist yet, so it's deleted; otherwise the row is restored to its
/// `old_*` columns.
pub async fn restore_from_version(
    tx: &mut Transaction<'_, Postgres>,
    height: i64,
) -> Result<(), sqlx::Error> {
    let rows = sqlx::query_as::<_, FirstVersionAboveHeight>(
        "SELECT DISTINCT ON (lock_hash) lock_hash, old_block_number, old_version, old_name,
            old_avatar, old_description, old_localization, action_type
         FROM issuer_info_versions
         WHERE block_number > $1
         ORDER BY lock_hash, block_number ASC",
    )
    .bind(height)
    .fetch_all(&mut **tx)
    .await?;

    for row in rows {
        if row.action_type == ActionType::Create as i16 {
            sqlx::query("DELETE FROM issuer_infos WHERE lock_hash = $1")
                .bind(&row.lock_hash)
                .execute(&mut **tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO issuer_infos
                    (block_number, lock_hash, lock_hash_crc, version, name, avatar, description, localization)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 ON CONFLICT (lock_hash) DO UPDATE SET
                    block_number = $1, version = $4, name = $5, avatar = $6, description = $7, localization = $8",
            )
            .bind(row.old_block_number)
            .bind(&row.lock_hash)
            .bind(crc32_of(&row.lock_hash))
            .bind(row.old_version.unwrap_or_default())
            .bind(row.old_name.unwrap_or_default())
            .bind(row.old_avatar.unwrap_or_default())
            .bind(row.old_description.unwrap_or_default())
            .bind(row.old_localization.unwrap_or_default())
            .execute(&mut **tx)
            .await?;
        }
    }

    sqlx::query("DELETE FROM issuer_info_versions WHERE block_number > $1")
        .bind(height)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_issuer_blob() {
        let json = serde_json::json!({"version": "1.0", "name": "Alice", "avatar": "ipfs://x", "description": "d"});
        let meta = parse(&json).unwrap();
        assert_eq!(meta.name, "Alice");
    }

    #[test]
    fn rejects_a_blob_with_no_name() {
        let json = serde_json::json!({"version": "1.0"});
        assert!(parse(&json).is_err());
    }
}
