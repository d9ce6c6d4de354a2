//! Per-operation Molecule decoders, grounded on the field-accessor call
//! sites of `internal/biz`'s entry generators (`generateTransferWithdrawV0KvPairs`,
//! `generateTransferUpdateWithdrawV1ToV2KvPairs`, `generateDefineKey/Value`,
//! `generateMintCotaKvPair`, `generateHoldKvPair`, `generateClaimKvPair`).

use crate::error::CodecError;
use crate::molecule::{raw_bytes, take, DynVec, FixVec, Table};

use super::layout::{
    u32_be, CLAIM_KEY_LEN, CLAIM_UPDATE_PAYLOAD_LEN, COTA_ID_LEN, DEFINE_PAYLOAD_LEN,
    HOLD_PAYLOAD_LEN, INDEX_LEN, NFT_ID_LEN, NFT_INFO_LEN, WITHDRAWAL_KEY_V0_LEN,
    WITHDRAWAL_KEY_V1_LEN,
};
use super::{hex_field, ClaimUpdateDto, ClaimedDto, DefineDto, HoldDto, NftInfoDto, ReceiverScriptDto, WithdrawDto};

fn nft_id_to_cota_and_index(nft_id: &[u8]) -> Result<(String, u32), CodecError> {
    if nft_id.len() != NFT_ID_LEN {
        return Err(CodecError::TooShort { need: NFT_ID_LEN, got: nft_id.len() });
    }
    let cota_id = hex_field(&nft_id[..COTA_ID_LEN]);
    let index = u32_be(&nft_id[COTA_ID_LEN..COTA_ID_LEN + INDEX_LEN]);
    Ok((cota_id, index))
}

fn decode_nft_info(raw: &[u8]) -> Result<NftInfoDto, CodecError> {
    if raw.len() != NFT_INFO_LEN {
        return Err(CodecError::SizeMismatch { declared: NFT_INFO_LEN, actual: raw.len() });
    }
    Ok(NftInfoDto {
        state: raw[0],
        configure: raw[1],
        characteristic: hex_field(&raw[2..]),
    })
}

/// A CoTA `Script` table: `code_hash | hash_type | args`, the same 3-field
/// shape as the chain's own lock/type scripts.
fn decode_receiver_script(raw: &[u8]) -> Result<ReceiverScriptDto, CodecError> {
    let t = Table::new(raw, 3)?;
    let code_hash = hex_field(t.field(0)?);
    let hash_type_raw = t.field(1)?;
    let hash_type = match hash_type_raw.first() {
        Some(0) => "data",
        Some(1) => "type",
        Some(2) => "data1",
        _ => "unknown",
    };
    let args = hex_field(raw_bytes(t.field(2)?)?);
    Ok(ReceiverScriptDto { code_hash, hash_type: hash_type.to_string(), args })
}

pub fn decode_define(payload: &[u8]) -> Result<DefineDto, CodecError> {
    let body = take(payload, DEFINE_PAYLOAD_LEN)?;
    let cota_id = hex_field(&body[..COTA_ID_LEN]);
    let total = u32_be(&body[COTA_ID_LEN..COTA_ID_LEN + INDEX_LEN]);
    let issued = u32_be(&body[COTA_ID_LEN + INDEX_LEN..COTA_ID_LEN + 2 * INDEX_LEN]);
    let configure = body[COTA_ID_LEN + 2 * INDEX_LEN];
    Ok(DefineDto { cota_id, total, issued, configure })
}

pub fn decode_hold(payload: &[u8]) -> Result<HoldDto, CodecError> {
    let body = take(payload, HOLD_PAYLOAD_LEN)?;
    let (cota_id, token_index) = nft_id_to_cota_and_index(&body[..NFT_ID_LEN])?;
    let info = decode_nft_info(&body[NFT_ID_LEN..])?;
    Ok(HoldDto {
        cota_id,
        token_index,
        state: info.state,
        configure: info.configure,
        characteristic: info.characteristic,
    })
}

pub fn decode_claim_update(payload: &[u8]) -> Result<ClaimUpdateDto, CodecError> {
    let body = take(payload, CLAIM_UPDATE_PAYLOAD_LEN)?;
    let claim_key = &body[..CLAIM_KEY_LEN];
    let (cota_id, token_index) = nft_id_to_cota_and_index(&claim_key[..NFT_ID_LEN])?;
    let out_point = hex_field(&claim_key[NFT_ID_LEN..]);
    let info = decode_nft_info(&body[CLAIM_KEY_LEN..])?;

    Ok(ClaimUpdateDto {
        claimed: ClaimedDto { cota_id: cota_id.clone(), token_index, out_point },
        hold: HoldDto {
            cota_id,
            token_index,
            state: info.state,
            configure: info.configure,
            characteristic: info.characteristic,
        },
    })
}

/// Mint always produces fresh withdrawals in the V1+ key shape
/// (`NftId | OutPoint`) regardless of the entry's own opcode version —
/// `generateMintCotaKvPair` reuses the same withdrawal value encoder the
/// V1/V2 transfer path uses.
pub fn decode_mint(payload: &[u8], _version: u8) -> Result<Vec<WithdrawDto>, CodecError> {
    decode_withdrawals_v1(payload, 1)
}

fn decode_withdrawals_v0(payload: &[u8]) -> Result<Vec<WithdrawDto>, CodecError> {
    let t = Table::new(payload, 2)?;
    let keys = FixVec::new(t.field(0)?, WITHDRAWAL_KEY_V0_LEN)?;
    let values = DynVec::new(t.field(1)?)?;
    if keys.len() != values.len() {
        return Err(CodecError::SizeMismatch { declared: keys.len(), actual: values.len() });
    }

    let mut out = Vec::with_capacity(keys.len());
    for i in 0..keys.len() {
        let key = keys.get(i);
        let cota_id = hex_field(&key[..COTA_ID_LEN]);
        let token_index = u32_be(&key[COTA_ID_LEN..]);

        let value = Table::new(values.get(i)?, 3)?;
        let nft_info = decode_nft_info(value.field(0)?)?;
        let receiver_lock = decode_receiver_script(value.field(1)?)?;
        let out_point = hex_field(value.field(2)?);

        out.push(WithdrawDto {
            cota_id,
            token_index,
            out_point,
            nft_info,
            receiver_lock,
            version: 0,
        });
    }
    Ok(out)
}

fn decode_withdrawals_v1(payload: &[u8], version: u8) -> Result<Vec<WithdrawDto>, CodecError> {
    let t = Table::new(payload, 2)?;
    let keys = FixVec::new(t.field(0)?, WITHDRAWAL_KEY_V1_LEN)?;
    let values = DynVec::new(t.field(1)?)?;
    if keys.len() != values.len() {
        return Err(CodecError::SizeMismatch { declared: keys.len(), actual: values.len() });
    }

    let mut out = Vec::with_capacity(keys.len());
    for i in 0..keys.len() {
        let key = keys.get(i);
        let (cota_id, token_index) = nft_id_to_cota_and_index(&key[..NFT_ID_LEN])?;
        let out_point = hex_field(&key[NFT_ID_LEN..]);

        let value = Table::new(values.get(i)?, 2)?;
        let nft_info = decode_nft_info(value.field(0)?)?;
        let receiver_lock = decode_receiver_script(value.field(1)?)?;

        out.push(WithdrawDto {
            cota_id,
            token_index,
            out_point,
            nft_info,
            receiver_lock,
            version,
        });
    }
    Ok(out)
}

fn decode_claims(raw: &[u8]) -> Result<Vec<ClaimedDto>, CodecError> {
    let keys = FixVec::new(raw, CLAIM_KEY_LEN)?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys.iter() {
        let (cota_id, token_index) = nft_id_to_cota_and_index(&key[..NFT_ID_LEN])?;
        let out_point = hex_field(&key[NFT_ID_LEN..]);
        out.push(ClaimedDto { cota_id, token_index, out_point });
    }
    Ok(out)
}

/// Transfer and TransferUpdate share an identical on-chain payload shape —
/// they differ only in which repositories the Block Syncer writes the
/// decoded rows to — so one decoder serves both.
pub fn decode_transfer(
    payload: &[u8],
    version: u8,
    _is_update: bool,
) -> Result<(Vec<ClaimedDto>, Vec<WithdrawDto>), CodecError> {
    let outer = Table::new(payload, 2)?;
    let claims = decode_claims(outer.field(0)?)?;
    let withdrawals = match version {
        0 => decode_withdrawals_v0(outer.field(1)?)?,
        1 | 2 => decode_withdrawals_v1(outer.field(1)?, version)?,
        v => return Err(CodecError::UnsupportedVersion(v)),
    };
    Ok((claims, withdrawals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_table(fields: &[&[u8]]) -> Vec<u8> {
        let header_len = 4 + fields.len() * 4;
        let mut offsets = Vec::with_capacity(fields.len());
        let mut cursor = header_len;
        for f in fields {
            offsets.push(cursor as u32);
            cursor += f.len();
        }
        let mut out = Vec::with_capacity(cursor);
        out.extend_from_slice(&(cursor as u32).to_le_bytes());
        for o in &offsets {
            out.extend_from_slice(&o.to_le_bytes());
        }
        for f in fields {
            out.extend_from_slice(f);
        }
        out
    }

    fn build_fixvec(item_size: usize, items: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(items.len() as u32).to_le_bytes());
        for item in items {
            assert_eq!(item.len(), item_size);
            out.extend_from_slice(item);
        }
        out
    }

    fn nft_id(cota: u8, index: u32) -> Vec<u8> {
        let mut v = vec![cota; COTA_ID_LEN];
        v.extend_from_slice(&index.to_be_bytes());
        v
    }

    fn nft_info(state: u8, configure: u8) -> Vec<u8> {
        let mut v = vec![state, configure];
        v.extend_from_slice(&[0xaa; 20]);
        v
    }

    fn script_table(code_hash: &[u8], hash_type: u8, args: &[u8]) -> Vec<u8> {
        let mut args_bytes = vec![];
        args_bytes.extend_from_slice(&(args.len() as u32).to_le_bytes());
        args_bytes.extend_from_slice(args);
        build_table(&[code_hash, &[hash_type], &args_bytes])
    }

    #[test]
    fn decodes_define_payload() {
        let mut body = vec![7u8; COTA_ID_LEN];
        body.extend_from_slice(&100u32.to_be_bytes());
        body.extend_from_slice(&3u32.to_be_bytes());
        body.push(5);
        let dto = decode_define(&body).unwrap();
        assert_eq!(dto.total, 100);
        assert_eq!(dto.issued, 3);
        assert_eq!(dto.configure, 5);
    }

    #[test]
    fn decodes_hold_payload() {
        let mut body = nft_id(9, 2);
        body.extend_from_slice(&nft_info(1, 0));
        let dto = decode_hold(&body).unwrap();
        assert_eq!(dto.token_index, 2);
        assert_eq!(dto.state, 1);
    }

    #[test]
    fn decodes_claim_update_payload() {
        let mut body = nft_id(3, 1);
        body.extend_from_slice(&[0u8; 36]);
        body.extend_from_slice(&nft_info(2, 1));
        let dto = decode_claim_update(&body).unwrap();
        assert_eq!(dto.claimed.token_index, 1);
        assert_eq!(dto.hold.state, 2);
    }

    #[test]
    fn decodes_v0_transfer_withdrawals() {
        let key = nft_id(1, 0);
        let value = build_table(&[
            &nft_info(0, 0),
            &script_table(&[0u8; 32], 1, &[0xde, 0xad]),
            &[0u8; 36],
        ]);
        let keys_blob = build_fixvec(WITHDRAWAL_KEY_V0_LEN, &[&key]);
        let values_blob = build_table(&[&value]);
        let claims_blob = build_fixvec(CLAIM_KEY_LEN, &[]);
        let payload = build_table(&[&claims_blob, &build_table(&[&keys_blob, &values_blob])]);

        let (claims, withdrawals) = decode_transfer(&payload, 0, false).unwrap();
        assert!(claims.is_empty());
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].version, 0);
        assert_eq!(withdrawals[0].receiver_lock.hash_type, "type");
    }

    #[test]
    fn decodes_v1_mint_withdrawals() {
        let mut key = nft_id(4, 0);
        key.extend_from_slice(&[0u8; 36]);
        let value = build_table(&[&nft_info(0, 0), &script_table(&[1u8; 32], 0, &[])]);
        let keys_blob = build_fixvec(WITHDRAWAL_KEY_V1_LEN, &[&key]);
        let values_blob = build_table(&[&value]);
        let payload = build_table(&[&keys_blob, &values_blob]);

        let withdrawals = decode_mint(&payload, 1).unwrap();
        assert_eq!(withdrawals.len(), 1);
        assert_eq!(withdrawals[0].version, 1);
        assert_eq!(withdrawals[0].receiver_lock.hash_type, "data");
    }
}
