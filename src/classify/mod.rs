//! Block Classifier: walks a decoded block's transactions and produces an
//! ordered `(Operation, Entry)` stream plus a separate metadata-JSON
//! stream, the way `internal/biz/biz.go`'s `Entry` type and
//! `internal/biz/ct_meta.go`'s `ParseMetadata` do, generalized into one
//! pass over the same transaction-walking shape as
//! `block_processor::fetch_block_transactions`.

pub mod opcode;

use serde::Deserialize;

use crate::error::CodecError;
use crate::rpc::{strip_0x, Block, Script};

/// CoTA type-script code hashes this indexer recognizes. Real deployments
/// pin exact on-chain code hashes via configuration; these are placeholder
/// identifiers the classifier matches against the `type_script.code_hash`
/// of each transaction output.
pub const REGISTRY_TYPE_CODE_HASH: &str = "cota-registry";
pub const COTA_TYPE_CODE_HASH: &str = "cota-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Define,
    Mint,
    Transfer,
    TransferUpdate,
    HoldUpdateState,
    HoldUpdateCharacteristic,
    Claim,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub input_type: Vec<u8>,
    pub output_type: Vec<u8>,
    pub lock_script: Script,
    pub tx_index: u32,
    pub version: u8,
}

#[derive(Debug, Clone)]
pub struct MetaEntry {
    pub lock_script: Script,
    pub tx_index: u32,
    pub json: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CtMeta {
    pub id: String,
    pub ver: String,
    pub metadata: MetaData,
}

#[derive(Debug, Deserialize)]
pub struct MetaData {
    pub target: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: serde_json::Value,
}

pub fn parse_metadata(raw: &[u8]) -> Result<CtMeta, CodecError> {
    let meta: CtMeta = serde_json::from_slice(raw)
        .map_err(|e| CodecError::MalformedJson(e.to_string()))?;
    if meta.metadata.type_ != "issuer" && meta.metadata.type_ != "cota" {
        return Err(CodecError::InvalidMetaType);
    }
    Ok(meta)
}

/// Classifies one decoded block. Returns the operation/entry stream in
/// transaction order — correctness doesn't depend on inter-row order, only
/// on transaction atomicity, but the classifier still walks in natural
/// order so logs and `InvalidData.tx_index` stay meaningful.
pub fn classify_block(block: &Block) -> (Vec<(Operation, Entry)>, Vec<MetaEntry>) {
    let mut entries = Vec::new();
    let mut metas = Vec::new();

    for (tx_index, tx) in block.transactions.iter().enumerate() {
        let tx_index = tx_index as u32;

        for output in &tx.outputs {
            let Some(type_script) = &output.type_ else { continue };
            if type_script.code_hash != COTA_TYPE_CODE_HASH
                && type_script.code_hash != REGISTRY_TYPE_CODE_HASH
            {
                continue;
            }

            if let Some(witness_hex) = tx.witnesses.get(tx_index as usize) {
                if let Ok(witness) = hex::decode(strip_0x(witness_hex)) {
                    if let Some(&op_byte) = witness.first() {
                        if let Some(op) = opcode::operation_for(op_byte) {
                            let version = opcode::version_for(op_byte);
                            entries.push((
                                op,
                                Entry {
                                    input_type: witness,
                                    output_type: Vec::new(),
                                    lock_script: output.lock.clone(),
                                    tx_index,
                                    version,
                                },
                            ));
                        }
                    }
                }
            }
        }

        for data_hex in &tx.outputs_data {
            if let Ok(raw) = hex::decode(strip_0x(data_hex)) {
                if raw.first() == Some(&b'{') {
                    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&raw) {
                        if json.get("metadata").is_some() {
                            if let Some(output) = tx.outputs.first() {
                                metas.push(MetaEntry {
                                    lock_script: output.lock.clone(),
                                    tx_index,
                                    json,
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    (entries, metas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{CellOutput, Header, Transaction};

    fn cota_script() -> Script {
        Script {
            code_hash: COTA_TYPE_CODE_HASH.to_string(),
            hash_type: "type".to_string(),
            args: "0xbeef".to_string(),
        }
    }

    #[test]
    fn classifies_a_transfer_v0_entry() {
        let mut witness = vec![opcode::TRANSFER_V0];
        witness.extend_from_slice(&[0u8; 8]);
        let block = Block {
            header: Header {
                hash: "0x01".into(),
                parent_hash: "0x00".into(),
                number: "0x1".into(),
            },
            transactions: vec![Transaction {
                hash: "0xdead".into(),
                witnesses: vec![format!("0x{}", hex::encode(&witness))],
                outputs: vec![CellOutput {
                    lock: Script {
                        code_hash: "lock".into(),
                        hash_type: "type".into(),
                        args: "0x01".into(),
                    },
                    type_: Some(cota_script()),
                }],
                outputs_data: vec!["0x".into()],
            }],
        };

        let (entries, metas) = classify_block(&block);
        assert_eq!(entries.len(), 1);
        assert!(metas.is_empty());
        assert_eq!(entries[0].0, Operation::Transfer);
        assert_eq!(entries[0].1.version, 0);
    }

    #[test]
    fn parses_issuer_metadata() {
        let raw = br#"{"id":"1","ver":"1.0","metadata":{"target":"lock","type":"issuer","data":{}}}"#;
        let meta = parse_metadata(raw).unwrap();
        assert_eq!(meta.metadata.type_, "issuer");
    }

    #[test]
    fn rejects_unknown_metadata_type() {
        let raw = br#"{"id":"1","ver":"1.0","metadata":{"target":"lock","type":"bogus","data":{}}}"#;
        assert_eq!(parse_metadata(raw).unwrap_err(), CodecError::InvalidMetaType);
    }
}
