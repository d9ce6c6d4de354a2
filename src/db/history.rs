//! `*_version` tables: one row per mutation to a block-scoped or metadata
//! entity, carrying both the old and new value so Rollback can reconstruct
//! prior state.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct HoldCotaNftKvPairVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub token_index: i64,
    pub old_state: Option<i16>,
    pub state: i16,
    pub configure: i16,
    pub old_characteristic: Option<String>,
    pub characteristic: String,
    pub old_lock_hash: Option<String>,
    pub lock_hash: String,
    pub action_type: i16,
    pub tx_index: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct WithdrawCotaNftKvPairVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub token_index: i64,
    pub out_point: String,
    pub old_state: Option<i16>,
    pub state: i16,
    pub configure: i16,
    pub old_characteristic: Option<String>,
    pub characteristic: String,
    pub action_type: i16,
    pub tx_index: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClaimedCotaNftKvPairVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub token_index: i64,
    pub out_point: String,
    pub lock_hash: String,
    pub action_type: i16,
    pub tx_index: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DefineCotaNftKvPairVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub old_total: Option<i64>,
    pub total: i64,
    pub old_issued: Option<i64>,
    pub issued: i64,
    pub configure: i16,
    pub action_type: i16,
    pub tx_index: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct IssuerInfoVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub lock_hash: String,
    pub old_version: Option<String>,
    pub version: String,
    pub old_name: Option<String>,
    pub name: String,
    pub old_avatar: Option<String>,
    pub avatar: String,
    pub old_description: Option<String>,
    pub description: String,
    pub old_localization: Option<String>,
    pub localization: String,
    pub action_type: i16,
    pub tx_index: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClassInfoVersion {
    pub id: i64,
    pub old_block_number: i64,
    pub block_number: i64,
    pub cota_id: String,
    pub old_version: Option<String>,
    pub version: String,
    pub old_name: Option<String>,
    pub name: String,
    pub old_symbol: Option<String>,
    pub symbol: String,
    pub old_description: Option<String>,
    pub description: String,
    pub old_characteristic: Option<String>,
    pub characteristic: String,
    pub old_properties: Option<String>,
    pub properties: String,
    pub old_localization: Option<String>,
    pub localization: String,
    pub action_type: i16,
    pub tx_index: i64,
}
