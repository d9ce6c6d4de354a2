//! `class_infos`: one row per CoTA class's display metadata, grounded on
//! `internal/biz/ct_meta.go`'s `ParseClassInfo`.

use sqlx::{FromRow, Postgres, Transaction};

use crate::db::models::ActionType;
use crate::error::CodecError;
use crate::hashutil::crc32_of;

#[derive(Debug, Clone)]
pub struct ClassMetadata {
    pub version: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub audio: String,
    pub video: String,
    pub model: String,
    pub characteristic: String,
    pub properties: String,
    pub localization: String,
}

pub fn parse(data: &serde_json::Value) -> Result<ClassMetadata, CodecError> {
    let field = |key: &str| -> String {
        data.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
    };
    if data.get("name").is_none() {
        return Err(CodecError::MalformedJson("class metadata missing \"name\"".into()));
    }
    Ok(ClassMetadata {
        version: field("version"),
        name: field("name"),
        symbol: field("symbol"),
        description: field("description"),
        image: field("image"),
        audio: field("audio"),
        video: field("video"),
        model: field("model"),
        characteristic: field("characteristic"),
        properties: serde_json::to_string(data.get("properties").unwrap_or(&serde_json::Value::Null))
            .unwrap_or_default(),
        localization: serde_json::to_string(data.get("localization").unwrap_or(&serde_json::Value::Null))
            .unwrap_or_default(),
    })
}

#[derive(Debug, Clone, FromRow)]
struct ExistingClass {
    block_number: i64,
    version: String,
    name: String,
    symbol: String,
    description: String,
    characteristic: String,
    properties: String,
    localization: String,
}

pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    block_number: i64,
    cota_id: &str,
    meta: &ClassMetadata,
    tx_index: i64,
) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, ExistingClass>(
        "SELECT block_number, version, name, symbol, description, characteristic, properties, localization
         FROM class_infos WHERE cota_id = $1",
    )
    .bind(cota_id)
    .fetch_optional(&mut **tx)
    .await?;
    let old_block_number = existing.as_ref().map(|e| e.block_number).unwrap_or(block_number);
    let action_type = if existing.is_some() { ActionType::Update } else { ActionType::Create } as i16;

    sqlx::query(
        "INSERT INTO class_infos
            (block_number, cota_id, cota_id_crc, version, name, symbol, description,
             image, audio, video, model, characteristic, properties, localization)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         ON CONFLICT (cota_id) DO UPDATE SET
            block_number = $1, version = $4, name = $5, symbol = $6, description = $7,
            image = $8, audio = $9, video = $10, model = $11, characteristic = $12,
            properties = $13, localization = $14",
    )
    .bind(block_number)
    .bind(cota_id)
    .bind(crc32_of(cota_id))
    .bind(&meta.version)
    .bind(&meta.name)
    .bind(&meta.symbol)
    .bind(&meta.description)
    .bind(&meta.image)
    .bind(&meta.audio)
    .bind(&meta.video)
    .bind(&meta.model)
    .bind(&meta.characteristic)
    .bind(&meta.properties)
    .bind(&meta.localization)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO class_info_versions
            (old_block_number, block_number, cota_id, old_version, version, old_name, name,
             old_symbol, symbol, old_description, description, old_characteristic, characteristic,
             old_properties, properties, old_localization, localization, action_type, tx_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
    )
    .bind(old_block_number)
    .bind(block_number)
    .bind(cota_id)
    .bind(existing.as_ref().map(|e| e.version.clone()))
    .bind(&meta.version)
    .bind(existing.as_ref().map(|e| e.name.clone()))
    .bind(&meta.name)
    .bind(existing.as_ref().map(|e| e.symbol.clone()))
    .bind(&meta.symbol)
    .bind(existing.as_ref().map(|e| e.description.clone()))
    .bind(&meta.description)
    .bind(existing.as_ref().map(|e| e.characteristic.clone()))
    .bind(&meta.characteristic)
    .bind(existing.as_ref().map(|e| e.properties.clone()))
    .bind(&meta.properties)
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
    cota_id: String,
    old_block_number: i64,
    old_version: Option<String>,
    old_name: Option<String>,
    old_symbol: Option<String>,
    old_description: Option<String>,
    old_characteristic: Option<String>,
    old_properties: Option<String>,
    old_localization: Option<String>,
    action_type: i16,
}

/// Undoes every mutation recorded above `height`: for each cota_id, the
/// earliest `class_info_versions` row above `height` carries the value the
/// row held just before the rollback horizon. A `Create` row means the row
/// didn't exist yet, so it's deleted; otherwise the row is restored to its
/// `old_*` columns.
pub async fn restore_from_version(
    tx: &mut Transaction<'_, Postgres>,
    height: i64,
) -> Result<(), sqlx::Error> {
    let rows = sqlx::query_as::<_, FirstVersionAboveHeight>(
        "SELECT DISTINCT ON (cota_id) cota_id, old_block_number, old_version, old_name,
            old_symbol, old_description, old_characteristic, old_properties, old_localization,
            action_type
         FROM class_info_versions
         WHERE block_number > $1
         ORDER BY cota_id, block_number ASC",
    )
    .bind(height)
    .fetch_all(&mut **tx)
    .await?;

    for row in rows {
        if row.action_type == ActionType::Create as i16 {
            sqlx::query("DELETE FROM class_infos WHERE cota_id = $1")
                .bind(&row.cota_id)
                .execute(&mut **tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO class_infos
                    (block_number, cota_id, cota_id_crc, version, name, symbol, description,
                     image, audio, video, model, characteristic, properties, localization)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, '', '', '', '', $8, $9, $10)
                 ON CONFLICT (cota_id) DO UPDATE SET
                    block_number = $1, version = $4, name = $5, symbol = $6, description = $7,
                    characteristic = $8, properties = $9, localization = $10",
            )
            .bind(row.old_block_number)
            .bind(&row.cota_id)
            .bind(crc32_of(&row.cota_id))
            .bind(row.old_version.unwrap_or_default())
            .bind(row.old_name.unwrap_or_default())
            .bind(row.old_symbol.unwrap_or_default())
            .bind(row.old_description.unwrap_or_default())
            .bind(row.old_characteristic.unwrap_or_default())
            .bind(row.old_properties.unwrap_or_default())
            .bind(row.old_localization.unwrap_or_default())
            .execute(&mut **tx)
            .await?;
        }
    }

    sqlx::query("DELETE FROM class_info_versions WHERE block_number > $1")
        .bind(height)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_class_blob() {
        let json = serde_json::json!({"name": "Cats", "symbol": "CAT"});
        let meta = parse(&json).unwrap();
        assert_eq!(meta.symbol, "CAT");
    }

    #[test]
    fn rejects_a_blob_with_no_name() {
        let json = serde_json::json!({"symbol": "CAT"});
        assert!(parse(&json).is_err());
    }
}
