mod common;

use std::sync::Arc;
use std::time::Duration;

use cota_entries_indexer::classify::opcode;
use cota_entries_indexer::db::models::{ClaimedCotaNftKvPair, WithdrawCotaNftKvPair, CHECK_TYPE_SYNC};
use cota_entries_indexer::indexer::syncer::sync_block;
use cota_entries_indexer::indexer::controller::SyncController;
use cota_entries_indexer::repo::check_info;
use tokio_util::sync::CancellationToken;

use common::{
    cleanup_test_db, cota_block, metadata_block, plain_block, setup_test_db, transfer_payload,
    FakeRpcClient, WithdrawFixture,
};

async fn seed_cursor(pool: &sqlx::PgPool, block_number: i64, hash: &str) {
    let mut tx = pool.begin().await.unwrap();
    check_info::upsert(&mut tx, CHECK_TYPE_SYNC, block_number, hash).await.unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn fresh_start_advances_the_cursor_with_no_derived_rows() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 0, "").await;

    let mut parent = "".to_string();
    for n in 1..=5u64 {
        let hash = format!("hash_{n}");
        let block = plain_block(n, &hash, &parent);
        sync_block(&pool, &block).await?;
        parent = hash;
    }

    let cursor = check_info::get(&pool, CHECK_TYPE_SYNC).await?.expect("cursor exists");
    assert_eq!(cursor.block_number, 5);
    assert_eq!(cursor.block_hash, "hash_5");

    let (claimed,): (i64,) = sqlx::query_as("SELECT count(*) FROM claimed_cota_nft_kv_pairs")
        .fetch_one(&pool)
        .await?;
    assert_eq!(claimed, 0);

    cleanup_test_db(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn single_transfer_v0_writes_claims_and_a_withdrawal() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 99, "hash_99").await;

    let withdrawal = WithdrawFixture {
        cota_byte: 9,
        token_index: 0,
        state: 1,
        configure: 2,
        characteristic_byte: 0xaa,
        receiver_code_hash: [7u8; 32],
        receiver_hash_type: 1,
        receiver_args: vec![0xde, 0xad],
        out_point_byte: 0,
    };
    let payload = transfer_payload(0, &[(1, 0, 0xbb), (1, 1, 0xcc)], &[withdrawal]);
    let mut witness = vec![opcode::TRANSFER_V0];
    witness.extend_from_slice(&payload);

    let block = cota_block(100, "hash_100", "hash_99", witness);
    sync_block(&pool, &block).await?;

    let claims: Vec<ClaimedCotaNftKvPair> =
        sqlx::query_as("SELECT * FROM claimed_cota_nft_kv_pairs").fetch_all(&pool).await?;
    assert_eq!(claims.len(), 2);

    let withdrawals: Vec<WithdrawCotaNftKvPair> =
        sqlx::query_as("SELECT * FROM withdraw_cota_nft_kv_pairs").fetch_all(&pool).await?;
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].version, 0);

    let cursor = check_info::get(&pool, CHECK_TYPE_SYNC).await?.expect("cursor exists");
    assert_eq!(cursor.block_number, 100);

    cleanup_test_db(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn a_fork_rolls_back_a_single_level_and_leaves_the_cursor_alone() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 42, "h_a").await;

    let rpc = Arc::new(FakeRpcClient::new(43));
    rpc.insert_block(plain_block(43, "h43", "h_b"));

    let cancel = CancellationToken::new();
    let controller = SyncController::new(pool.clone(), rpc, "fast", 1, cancel.clone());

    let handle = tokio::spawn(async move { controller.run().await });
    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();
    handle.await??;

    let cursor = check_info::get(&pool, CHECK_TYPE_SYNC).await?.expect("cursor exists");
    assert_eq!(cursor.block_number, 42);
    assert_eq!(cursor.block_hash, "h_a");

    cleanup_test_db(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_issuer_metadata_collapses_to_one_row_with_full_history() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 199, "hash_199").await;

    let meta = r#"{"id":"1","ver":"1.0","metadata":{"target":"lock","type":"issuer","data":{"name":"Alice","avatar":"ipfs://x","description":"d","version":"1.0"}}}"#;

    let block1 = metadata_block(200, "hash_200", "hash_199", "0x1234", meta);
    sync_block(&pool, &block1).await?;

    let block2 = metadata_block(201, "hash_201", "hash_200", "0x1234", meta);
    sync_block(&pool, &block2).await?;

    let (issuers,): (i64,) = sqlx::query_as("SELECT count(*) FROM issuer_infos").fetch_one(&pool).await?;
    assert_eq!(issuers, 1);

    let (versions,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM issuer_info_versions").fetch_one(&pool).await?;
    assert_eq!(versions, 2);

    cleanup_test_db(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn a_malformed_entry_is_recorded_without_failing_the_block() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 199, "hash_199").await;

    let mut witness = vec![opcode::DEFINE];
    witness.extend_from_slice(&[1, 2, 3]); // far shorter than DEFINE_PAYLOAD_LEN

    let block = cota_block(200, "hash_200", "hash_199", witness);
    sync_block(&pool, &block).await?;

    let (invalid,): (i64,) = sqlx::query_as("SELECT count(*) FROM invalid_data").fetch_one(&pool).await?;
    assert_eq!(invalid, 1);

    let cursor = check_info::get(&pool, CHECK_TYPE_SYNC).await?.expect("cursor exists");
    assert_eq!(cursor.block_number, 200);

    cleanup_test_db(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn transfer_update_v2_populates_the_new_nft_info_on_withdrawal() -> anyhow::Result<()> {
    let pool = setup_test_db().await?;
    seed_cursor(&pool, 299, "hash_299").await;

    let withdrawal = WithdrawFixture {
        cota_byte: 4,
        token_index: 0,
        state: 3,
        configure: 5,
        characteristic_byte: 0x11,
        receiver_code_hash: [1u8; 32],
        receiver_hash_type: 0,
        receiver_args: vec![],
        out_point_byte: 9,
    };
    let payload = transfer_payload(2, &[], std::slice::from_ref(&withdrawal));
    let mut witness = vec![opcode::TRANSFER_UPDATE_V2];
    witness.extend_from_slice(&payload);

    let block = cota_block(300, "hash_300", "hash_299", witness);
    sync_block(&pool, &block).await?;

    let withdrawals: Vec<WithdrawCotaNftKvPair> =
        sqlx::query_as("SELECT * FROM withdraw_cota_nft_kv_pairs").fetch_all(&pool).await?;
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].version, 2);
    assert_eq!(withdrawals[0].state, 3);
    assert_eq!(withdrawals[0].configure, 5);
    assert_eq!(withdrawals[0].characteristic, hex::encode([0x11u8; 20]));

    cleanup_test_db(&pool).await?;
    Ok(())
}
