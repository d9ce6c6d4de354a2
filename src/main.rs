use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cota_entries_indexer::config::Settings;
use cota_entries_indexer::db;
use cota_entries_indexer::indexer::{CheckInfoCleaner, SyncController};
use cota_entries_indexer::metrics::{self, Metrics};
use cota_entries_indexer::rpc::JsonRpcClient;

#[derive(Parser)]
struct Args {
    /// Truncate every derived table before starting the sync.
    #[arg(long)]
    reset: bool,

    /// Sync loop pacing: "normal" polls at the configured interval,
    /// "fast" polls every 200ms.
    #[arg(long, default_value = "normal")]
    mode: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().unwrap_or_else(|e| {
        error!("failed to load configuration: {:?}", e);
        std::process::exit(1);
    });

    info!(db = %settings.database.redacted_connection_string(), ckb_node = %settings.ckb_node.url, "loaded settings");

    let prometheus_handle = metrics::setup_metrics_recorder();
    let _metrics = Metrics::new(prometheus_handle);
    info!("prometheus metrics initialized");

    let pool = db::connect(&settings.database).await.unwrap_or_else(|e| {
        error!("failed to connect to database: {:?}", e);
        std::process::exit(1);
    });
    info!("connected to database");

    if args.reset {
        reset_database(&pool).await?;
        info!("database reset");
    }

    db::schema::initialize_database(&pool).await?;
    info!("schema up to date");

    let rpc: Arc<dyn cota_entries_indexer::rpc::CkbRpcClient> =
        Arc::new(JsonRpcClient::new(settings.ckb_node.url.clone()));

    let cancel = CancellationToken::new();

    let controller = SyncController::new(
        pool.clone(),
        Arc::clone(&rpc),
        &args.mode,
        settings.indexer.poll_interval_secs,
        cancel.clone(),
    );
    let sync_handle = tokio::spawn(async move { controller.run().await });

    let cleaner = CheckInfoCleaner::new(pool.clone(), settings.indexer.cleaner_interval_secs, cancel.clone());
    let cleaner_handle = tokio::spawn(async move { cleaner.run().await });

    info!("cota entries indexer started");

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown requested, stopping tasks");
            cancel.cancel();
        }
        result = sync_handle => {
            if let Err(e) = result {
                error!("sync controller task panicked: {:?}", e);
            }
            cancel.cancel();
        }
    }

    rpc.close().await;
    let _ = cleaner_handle.await;

    Ok(())
}

async fn reset_database(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::query(
        "TRUNCATE TABLE
            check_infos, register_cota_kv_pairs, hold_cota_nft_kv_pairs,
            hold_cota_nft_kv_pair_versions, withdraw_cota_nft_kv_pairs,
            withdraw_cota_nft_kv_pair_versions, claimed_cota_nft_kv_pairs,
            claimed_cota_nft_kv_pair_versions, define_cota_nft_kv_pairs,
            define_cota_nft_kv_pair_versions, scripts, issuer_infos,
            issuer_info_versions, class_infos, class_info_versions, invalid_data
         RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
