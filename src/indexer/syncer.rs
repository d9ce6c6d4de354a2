//! Block Syncer: classify → decode → write, one Postgres transaction per
//! block. Grounded on `BlockProcessor::process_block` (fetch, open
//! transaction, write rows, commit) generalized from Bitcoin/Arch
//! transaction rows to CoTA derived rows, and on `biz.SyncService.SaveBlock`
//! for the per-operation dispatch this function implements.

use sqlx::PgPool;
use tracing::warn;

use crate::classify::{self, Operation};
use crate::codec::{self, Decoded};
use crate::db::models::CHECK_TYPE_SYNC;
use crate::error::SyncError;
use crate::hashutil::script_hash_hex;
use crate::repo::{check_info, claimed, class_info, define, hold, invalid_data, issuer_info, register, script, withdraw};
use crate::rpc::{strip_0x, Block};

fn hash_type_byte(hash_type: &str) -> u8 {
    match hash_type {
        "data" => 0,
        "type" => 1,
        "data1" => 2,
        _ => 1,
    }
}

/// Applies one block's worth of entries to the store. Idempotent: re-running
/// against the same block overwrites the same rows (every write is an
/// upsert keyed on the entity's natural key), which is what lets the Sync
/// Controller retry a failed block without double-counting.
pub async fn sync_block(pool: &PgPool, block: &Block) -> Result<(), SyncError> {
    let block_number = block.number().map_err(SyncError::Rpc)? as i64;
    let (entries, metas) = classify::classify_block(block);

    let mut tx = pool.begin().await?;

    for (op, entry) in &entries {
        let tx_index = entry.tx_index as i64;
        let decoded = match codec::decode(*op, entry) {
            Ok(d) => d,
            Err(e) => {
                warn!(block_number, tx_index, error = %e, "failed to decode entry");
                invalid_data::insert(&mut tx, block_number, tx_index, &e.to_string()).await?;
                continue;
            }
        };

        let lock_hash = script_hash_hex(
            &entry.lock_script.code_hash,
            hash_type_byte(&entry.lock_script.hash_type),
            &hex::decode(strip_0x(&entry.lock_script.args)).unwrap_or_default(),
        );

        match (op, decoded) {
            (Operation::Register, Decoded::Register) => {
                register::insert(&mut tx, block_number, &lock_hash).await?;
            }
            (Operation::Define, Decoded::Define(d)) => {
                define::upsert(&mut tx, block_number, &d.cota_id, d.total as i64, d.issued as i64, d.configure as i16, tx_index).await?;
            }
            (Operation::Mint, Decoded::Mint { withdrawals }) => {
                if let Some(first) = withdrawals.first() {
                    if define::increment_issued(&mut tx, block_number, &first.cota_id, tx_index).await?.is_none() {
                        invalid_data::insert(
                            &mut tx,
                            block_number,
                            tx_index,
                            &format!("mint references undefined cota_id {}", first.cota_id),
                        )
                        .await?;
                        continue;
                    }
                }
                for w in withdrawals {
                    write_withdrawal(&mut tx, block_number, tx_index, &lock_hash, w).await?;
                }
            }
            (Operation::Transfer | Operation::TransferUpdate, Decoded::Transfer { claims, withdrawals }) => {
                for c in claims {
                    claimed::insert(&mut tx, block_number, &c.cota_id, c.token_index as i64, &c.out_point, &lock_hash, tx_index).await?;
                }
                for w in withdrawals {
                    write_withdrawal(&mut tx, block_number, tx_index, &lock_hash, w).await?;
                }
            }
            (Operation::HoldUpdateState | Operation::HoldUpdateCharacteristic, Decoded::Hold(h)) => {
                hold::upsert(
                    &mut tx,
                    block_number,
                    &h.cota_id,
                    h.token_index as i64,
                    h.state as i16,
                    h.configure as i16,
                    &h.characteristic,
                    &lock_hash,
                    tx_index,
                )
                .await?;
            }
            (Operation::Claim, Decoded::Claim(c)) => {
                claimed::insert(&mut tx, block_number, &c.claimed.cota_id, c.claimed.token_index as i64, &c.claimed.out_point, &lock_hash, tx_index).await?;
                hold::upsert(
                    &mut tx,
                    block_number,
                    &c.hold.cota_id,
                    c.hold.token_index as i64,
                    c.hold.state as i16,
                    c.hold.configure as i16,
                    &c.hold.characteristic,
                    &lock_hash,
                    tx_index,
                )
                .await?;
            }
            (op, decoded) => {
                return Err(SyncError::Invariant(format!(
                    "classifier/codec mismatch: op {op:?} produced {decoded:?}"
                )));
            }
        }
    }

    for meta in &metas {
        let tx_index = meta.tx_index as i64;
        let lock_hash = script_hash_hex(
            &meta.lock_script.code_hash,
            hash_type_byte(&meta.lock_script.hash_type),
            &hex::decode(strip_0x(&meta.lock_script.args)).unwrap_or_default(),
        );
        match classify::parse_metadata(meta.json.to_string().as_bytes()) {
            Ok(ct_meta) if ct_meta.metadata.type_ == "issuer" => match issuer_info::parse(&ct_meta.metadata.data) {
                Ok(parsed) => issuer_info::upsert(&mut tx, block_number, &lock_hash, &parsed, tx_index).await?,
                Err(e) => invalid_data::insert(&mut tx, block_number, tx_index, &e.to_string()).await?,
            },
            Ok(ct_meta) => match class_info::parse(&ct_meta.metadata.data) {
                Ok(parsed) => class_info::upsert(&mut tx, block_number, &ct_meta.id, &parsed, tx_index).await?,
                Err(e) => invalid_data::insert(&mut tx, block_number, tx_index, &e.to_string()).await?,
            },
            Err(e) => invalid_data::insert(&mut tx, block_number, tx_index, &e.to_string()).await?,
        }
    }

    check_info::upsert(&mut tx, CHECK_TYPE_SYNC, block_number, strip_0x(&block.header.hash)).await?;

    tx.commit().await?;
    Ok(())
}

async fn write_withdrawal(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    block_number: i64,
    tx_index: i64,
    lock_hash: &str,
    w: crate::codec::WithdrawDto,
) -> Result<(), SyncError> {
    let script_id = script::find_or_create(
        tx,
        &w.receiver_lock.code_hash,
        &w.receiver_lock.hash_type,
        &w.receiver_lock.args,
    )
    .await?;
    withdraw::insert(
        tx,
        block_number,
        &w.cota_id,
        w.token_index as i64,
        &w.out_point,
        w.nft_info.state as i16,
        w.nft_info.configure as i16,
        &w.nft_info.characteristic,
        script_id,
        lock_hash,
        w.version as i16,
        tx_index,
    )
    .await?;
    Ok(())
}
