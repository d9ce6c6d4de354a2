//! Fixed byte widths of the CoTA SMT key/value structs, derived from the
//! field-accessor call sites that consume them (`key.NftId().CotaId()`,
//! `.Index()`, `.OutPoint()`, …).

pub const COTA_ID_LEN: usize = 20;
pub const INDEX_LEN: usize = 4;
pub const NFT_ID_LEN: usize = COTA_ID_LEN + INDEX_LEN; // 24
pub const OUT_POINT_LEN: usize = 36; // tx_hash(32) + index(4)
pub const CLAIM_KEY_LEN: usize = NFT_ID_LEN + OUT_POINT_LEN; // 60, same shape every version
pub const WITHDRAWAL_KEY_V0_LEN: usize = NFT_ID_LEN; // cota_id + index, flat
pub const WITHDRAWAL_KEY_V1_LEN: usize = NFT_ID_LEN + OUT_POINT_LEN; // 60
pub const CHARACTERISTIC_LEN: usize = 20;
pub const NFT_INFO_LEN: usize = 1 + 1 + CHARACTERISTIC_LEN; // state + configure + characteristic = 22
pub const CODE_HASH_LEN: usize = 32;
pub const DEFINE_PAYLOAD_LEN: usize = COTA_ID_LEN + INDEX_LEN + INDEX_LEN + 1; // cota_id + total + issued + configure
pub const HOLD_PAYLOAD_LEN: usize = NFT_ID_LEN + NFT_INFO_LEN;
pub const CLAIM_UPDATE_PAYLOAD_LEN: usize = CLAIM_KEY_LEN + NFT_INFO_LEN;

pub fn u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
