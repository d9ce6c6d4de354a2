//! Codec Adapters: one decoder per (operation, version) pair, dispatched
//! from a single tagged match rather than per-version functions each
//! repeating a near-identical body.

pub mod entries;
mod layout;

use crate::classify::{Entry, Operation};
use crate::error::CodecError;
use crate::hashutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftInfoDto {
    pub state: u8,
    pub configure: u8,
    pub characteristic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverScriptDto {
    pub code_hash: String,
    pub hash_type: String,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedDto {
    pub cota_id: String,
    pub token_index: u32,
    pub out_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawDto {
    pub cota_id: String,
    pub token_index: u32,
    pub out_point: String,
    pub nft_info: NftInfoDto,
    pub receiver_lock: ReceiverScriptDto,
    pub version: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineDto {
    pub cota_id: String,
    pub total: u32,
    pub issued: u32,
    pub configure: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldDto {
    pub cota_id: String,
    pub token_index: u32,
    pub state: u8,
    pub configure: u8,
    pub characteristic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimUpdateDto {
    pub claimed: ClaimedDto,
    pub hold: HoldDto,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Register,
    Define(DefineDto),
    Mint { withdrawals: Vec<WithdrawDto> },
    Transfer { claims: Vec<ClaimedDto>, withdrawals: Vec<WithdrawDto> },
    Hold(HoldDto),
    Claim(ClaimUpdateDto),
}

/// Decodes one classified entry. Never aborts the block on failure — the
/// caller (Block Syncer) records a `CodecError` into `InvalidData` and
/// moves on.
pub fn decode(op: Operation, entry: &Entry) -> Result<Decoded, CodecError> {
    let payload = entry
        .input_type
        .get(1..)
        .ok_or(CodecError::TooShort { need: 1, got: entry.input_type.len() })?;

    match op {
        Operation::Register => Ok(Decoded::Register),
        Operation::Define => entries::decode_define(payload).map(Decoded::Define),
        Operation::Mint => entries::decode_mint(payload, entry.version)
            .map(|withdrawals| Decoded::Mint { withdrawals }),
        Operation::Transfer => {
            let (claims, withdrawals) = entries::decode_transfer(payload, entry.version, false)?;
            Ok(Decoded::Transfer { claims, withdrawals })
        }
        Operation::TransferUpdate => {
            let (claims, withdrawals) = entries::decode_transfer(payload, entry.version, true)?;
            Ok(Decoded::Transfer { claims, withdrawals })
        }
        Operation::HoldUpdateState | Operation::HoldUpdateCharacteristic => {
            entries::decode_hold(payload).map(Decoded::Hold)
        }
        Operation::Claim => entries::decode_claim_update(payload).map(Decoded::Claim),
    }
}

pub(crate) fn hex_field(bytes: &[u8]) -> String {
    to_hex(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::opcode;
    use crate::rpc::Script;

    fn entry(opcode_byte: u8, payload: Vec<u8>) -> Entry {
        let mut input_type = vec![opcode_byte];
        input_type.extend(payload);
        Entry {
            input_type,
            output_type: Vec::new(),
            lock_script: Script { code_hash: "lock".into(), hash_type: "type".into(), args: "0x01".into() },
            tx_index: 0,
            version: opcode::version_for(opcode_byte),
        }
    }

    #[test]
    fn register_has_no_payload_dependency() {
        let e = entry(opcode::REGISTER, vec![]);
        assert_eq!(decode(Operation::Register, &e).unwrap(), Decoded::Register);
    }

    #[test]
    fn too_short_payload_is_a_decode_error() {
        let e = entry(opcode::DEFINE, vec![1, 2, 3]);
        assert!(decode(Operation::Define, &e).is_err());
    }
}
