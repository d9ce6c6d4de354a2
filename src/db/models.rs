//! Row types for every derived table. Grounded on the shape of
//! `internal/data/*.go`'s structs (same field names, same CRC
//! sibling-column convention), translated to `sqlx::FromRow` structs the
//! way `db::models` mirrors its own tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CHECK_TYPE_SYNC: i16 = 0;

/// 0 = create, 1 = update, 2 = delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum ActionType {
    Create = 0,
    Update = 1,
    Delete = 2,
}

#[derive(Debug, Clone, FromRow)]
pub struct CheckInfo {
    pub id: i64,
    pub check_type: i16,
    pub block_number: i64,
    pub block_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RegisterCotaKvPair {
    pub id: i64,
    pub block_number: i64,
    pub lock_hash: String,
    pub lock_hash_crc: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct HoldCotaNftKvPair {
    pub id: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub cota_id_crc: i64,
    pub token_index: i64,
    pub state: i16,
    pub configure: i16,
    pub characteristic: String,
    pub lock_hash: String,
    pub lock_hash_crc: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct WithdrawCotaNftKvPair {
    pub id: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub cota_id_crc: i64,
    pub token_index: i64,
    pub out_point: String,
    pub out_point_crc: i64,
    pub state: i16,
    pub configure: i16,
    pub characteristic: String,
    pub receiver_lock_script_id: i64,
    pub lock_hash: String,
    pub lock_hash_crc: i64,
    pub version: i16,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClaimedCotaNftKvPair {
    pub id: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub cota_id_crc: i64,
    pub token_index: i64,
    pub out_point: String,
    pub out_point_crc: i64,
    pub lock_hash: String,
    pub lock_hash_crc: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DefineCotaNftKvPair {
    pub id: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub cota_id_crc: i64,
    pub total: i64,
    pub issued: i64,
    pub configure: i16,
}

#[derive(Debug, Clone, FromRow)]
pub struct Script {
    pub id: i64,
    pub code_hash: String,
    pub code_hash_crc: i64,
    pub hash_type: String,
    pub args: String,
    pub args_crc: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct IssuerInfo {
    pub id: i64,
    pub block_number: i64,
    pub lock_hash: String,
    pub lock_hash_crc: i64,
    pub version: String,
    pub name: String,
    pub avatar: String,
    pub description: String,
    pub localization: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClassInfo {
    pub id: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub cota_id_crc: i64,
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

#[derive(Debug, Clone, FromRow)]
pub struct InvalidData {
    pub id: i64,
    pub block_number: i64,
    pub tx_index: i64,
    pub reason: String,
}
