use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cota_entries_indexer::db::schema::initialize_database;
use cota_entries_indexer::rpc::{Block, CellOutput, ChainInfo, CkbRpcClient, Header, Script, Transaction};
use sqlx::PgPool;

pub async fn setup_test_db() -> anyhow::Result<PgPool> {
    dotenv::from_filename(".env.test").ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env.test");

    let pool = PgPool::connect(&database_url).await?;

    cleanup_test_db(&pool).await?;
    initialize_database(&pool).await?;

    Ok(pool)
}

pub async fn cleanup_test_db(pool: &PgPool) -> anyhow::Result<()> {
    const TABLES: &[&str] = &[
        "invalid_data",
        "class_info_versions",
        "class_infos",
        "issuer_info_versions",
        "issuer_infos",
        "define_cota_nft_kv_pair_versions",
        "define_cota_nft_kv_pairs",
        "claimed_cota_nft_kv_pair_versions",
        "claimed_cota_nft_kv_pairs",
        "withdraw_cota_nft_kv_pair_versions",
        "withdraw_cota_nft_kv_pairs",
        "scripts",
        "hold_cota_nft_kv_pair_versions",
        "hold_cota_nft_kv_pairs",
        "register_cota_kv_pairs",
        "check_infos",
    ];
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// A `CkbRpcClient` backed by an in-memory block map, standing in for a CKB
/// node in tests. `set_tip`/`insert_block` can be called mid-test to move
/// the simulated chain forward or replace a block at a height (a fork).
pub struct FakeRpcClient {
    blocks: Mutex<HashMap<u64, Block>>,
    tip: AtomicU64,
}

impl FakeRpcClient {
    pub fn new(tip: u64) -> Self {
        Self { blocks: Mutex::new(HashMap::new()), tip: AtomicU64::new(tip) }
    }

    pub fn insert_block(&self, block: Block) {
        let number = block.number().expect("fixture block has a valid hex number");
        self.blocks.lock().unwrap().insert(number, block);
    }

    pub fn set_tip(&self, tip: u64) {
        self.tip.store(tip, Ordering::SeqCst);
    }
}

#[async_trait]
impl CkbRpcClient for FakeRpcClient {
    async fn get_tip_block_number(&self) -> anyhow::Result<u64> {
        Ok(self.tip.load(Ordering::SeqCst))
    }

    async fn get_block_by_number(&self, number: u64) -> anyhow::Result<Option<Block>> {
        Ok(self.blocks.lock().unwrap().get(&number).cloned())
    }

    async fn get_blockchain_info(&self) -> anyhow::Result<ChainInfo> {
        Ok(ChainInfo { chain: "test".to_string(), median_time: None, epoch: None })
    }

    async fn close(&self) {}
}

pub fn lock_script(args: &str) -> Script {
    Script { code_hash: "lock-code-hash".to_string(), hash_type: "type".to_string(), args: args.to_string() }
}

pub fn cota_type_script() -> Script {
    Script {
        code_hash: cota_entries_indexer::classify::COTA_TYPE_CODE_HASH.to_string(),
        hash_type: "type".to_string(),
        args: "0xbeef".to_string(),
    }
}

/// A block with no CoTA cells at all — a plain chain-advancing block.
pub fn plain_block(number: u64, hash: &str, parent_hash: &str) -> Block {
    Block {
        header: Header { hash: hash.to_string(), parent_hash: parent_hash.to_string(), number: format!("0x{number:x}") },
        transactions: vec![Transaction {
            hash: format!("0xtx{number}"),
            witnesses: vec![],
            outputs: vec![CellOutput { lock: lock_script("0x01"), type_: None }],
            outputs_data: vec!["0x".to_string()],
        }],
    }
}

/// A single-transaction block whose one transaction carries one CoTA
/// witness/output pair at output index 0.
pub fn cota_block(number: u64, hash: &str, parent_hash: &str, witness: Vec<u8>) -> Block {
    Block {
        header: Header { hash: hash.to_string(), parent_hash: parent_hash.to_string(), number: format!("0x{number:x}") },
        transactions: vec![Transaction {
            hash: format!("0xtx{number}"),
            witnesses: vec![format!("0x{}", hex::encode(&witness))],
            outputs: vec![CellOutput { lock: lock_script("0x01"), type_: Some(cota_type_script()) }],
            outputs_data: vec!["0x".to_string()],
        }],
    }
}

/// A single-transaction block whose one output carries a metadata JSON blob
/// instead of a CoTA witness (the shape `classify_block` looks for in
/// `outputs_data`).
pub fn metadata_block(number: u64, hash: &str, parent_hash: &str, lock_hash_args: &str, meta_json: &str) -> Block {
    Block {
        header: Header { hash: hash.to_string(), parent_hash: parent_hash.to_string(), number: format!("0x{number:x}") },
        transactions: vec![Transaction {
            hash: format!("0xtx{number}"),
            witnesses: vec![],
            outputs: vec![CellOutput { lock: lock_script(lock_hash_args), type_: None }],
            outputs_data: vec![format!("0x{}", hex::encode(meta_json.as_bytes()))],
        }],
    }
}

// --- Molecule builders, mirroring the encoders the codec layer decodes. ---

pub const COTA_ID_LEN: usize = 20;
pub const INDEX_LEN: usize = 4;
pub const NFT_ID_LEN: usize = COTA_ID_LEN + INDEX_LEN;
pub const OUT_POINT_LEN: usize = 36;
pub const CLAIM_KEY_LEN: usize = NFT_ID_LEN + OUT_POINT_LEN;
pub const WITHDRAWAL_KEY_V0_LEN: usize = NFT_ID_LEN;
pub const WITHDRAWAL_KEY_V1_LEN: usize = NFT_ID_LEN + OUT_POINT_LEN;

pub fn build_table(fields: &[&[u8]]) -> Vec<u8> {
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

pub fn build_fixvec(item_size: usize, items: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(items.len() as u32).to_le_bytes());
    for item in items {
        assert_eq!(item.len(), item_size);
        out.extend_from_slice(item);
    }
    out
}

pub fn nft_id(cota_byte: u8, index: u32) -> Vec<u8> {
    let mut v = vec![cota_byte; COTA_ID_LEN];
    v.extend_from_slice(&index.to_be_bytes());
    v
}

pub fn claim_key(cota_byte: u8, index: u32, out_point_byte: u8) -> Vec<u8> {
    let mut v = nft_id(cota_byte, index);
    v.extend_from_slice(&[out_point_byte; OUT_POINT_LEN]);
    v
}

pub fn nft_info(state: u8, configure: u8, characteristic_byte: u8) -> Vec<u8> {
    let mut v = vec![state, configure];
    v.extend_from_slice(&[characteristic_byte; 20]);
    v
}

pub fn script_table(code_hash: &[u8], hash_type: u8, args: &[u8]) -> Vec<u8> {
    let mut args_bytes = Vec::new();
    args_bytes.extend_from_slice(&(args.len() as u32).to_le_bytes());
    args_bytes.extend_from_slice(args);
    build_table(&[code_hash, &[hash_type], &args_bytes])
}

/// One withdrawal fixture: a CoTA id/token index, the NftInfo it carries,
/// the receiver lock script it targets, and (for the V1/V2 key shape only)
/// the out-point byte baked into the withdrawal key.
pub struct WithdrawFixture {
    pub cota_byte: u8,
    pub token_index: u32,
    pub state: u8,
    pub configure: u8,
    pub characteristic_byte: u8,
    pub receiver_code_hash: [u8; 32],
    pub receiver_hash_type: u8,
    pub receiver_args: Vec<u8>,
    pub out_point_byte: u8,
}

/// A transfer (V0/V1/V2) payload: `claims:fixvec<claim_key> | withdrawals table`.
pub fn transfer_payload(version: u8, claims: &[(u8, u32, u8)], withdrawals: &[WithdrawFixture]) -> Vec<u8> {
    let claim_keys: Vec<Vec<u8>> = claims.iter().map(|(c, i, o)| claim_key(*c, *i, *o)).collect();
    let claim_refs: Vec<&[u8]> = claim_keys.iter().map(|v| v.as_slice()).collect();
    let claims_blob = build_fixvec(CLAIM_KEY_LEN, &claim_refs);

    let values: Vec<Vec<u8>> = withdrawals
        .iter()
        .map(|w| {
            let info = nft_info(w.state, w.configure, w.characteristic_byte);
            let script = script_table(&w.receiver_code_hash, w.receiver_hash_type, &w.receiver_args);
            if version == 0 {
                build_table(&[&info, &script, &[0u8; OUT_POINT_LEN]])
            } else {
                build_table(&[&info, &script])
            }
        })
        .collect();
    let value_refs: Vec<&[u8]> = values.iter().map(|v| v.as_slice()).collect();
    let values_blob = build_table(&value_refs);

    let withdrawals_blob = if version == 0 {
        let keys: Vec<Vec<u8>> = withdrawals.iter().map(|w| nft_id(w.cota_byte, w.token_index)).collect();
        let key_refs: Vec<&[u8]> = keys.iter().map(|v| v.as_slice()).collect();
        let keys_blob = build_fixvec(WITHDRAWAL_KEY_V0_LEN, &key_refs);
        build_table(&[&keys_blob, &values_blob])
    } else {
        let keys: Vec<Vec<u8>> = withdrawals
            .iter()
            .map(|w| {
                let mut k = nft_id(w.cota_byte, w.token_index);
                k.extend_from_slice(&[w.out_point_byte; OUT_POINT_LEN]);
                k
            })
            .collect();
        let key_refs: Vec<&[u8]> = keys.iter().map(|v| v.as_slice()).collect();
        let keys_blob = build_fixvec(WITHDRAWAL_KEY_V1_LEN, &key_refs);
        build_table(&[&keys_blob, &values_blob])
    };

    build_table(&[&claims_blob, &withdrawals_blob])
}
