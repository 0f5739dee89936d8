use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tierstore_storage::{FileTier, MemoryTier, Migrator, Storage};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;

use crate::config::TierStoreConfig;

#[derive(Parser, Debug)]
#[command(name = "tierstore-daemon")]
#[command(about = "Two-tier record store with background hot/cold migration", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (otherwise TIERSTORE_CONFIG, ./config/tierstore, /etc/tierstore/tierstore)
    #[arg(long, global = true, env = "TIERSTORE_CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open both tiers and run the migrator until SIGINT/SIGTERM, then drain hot into cold
    Run,

    /// Print every cold-tier record as JSON (does not bump access counts)
    Inspect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TierStoreConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TierStoreConfig::load().context("loading config")?,
    };

    match cli.command {
        Commands::Run => run(config).await,
        Commands::Inspect => inspect(config).await,
    }
}

async fn open_tiers(config: &TierStoreConfig) -> anyhow::Result<(Arc<MemoryTier>, Arc<FileTier>)> {
    let hot = Arc::new(MemoryTier::new());
    let cold = Arc::new(
        FileTier::new(&config.storage.cold_dir)
            .await
            .with_context(|| format!("opening cold tier at {}", config.storage.cold_dir.display()))?,
    );
    Ok((hot, cold))
}

async fn run(config: TierStoreConfig) -> anyhow::Result<()> {
    let (hot, cold) = open_tiers(&config).await?;
    let migrator = Migrator::new(hot, cold, config.migration.clone())?;

    info!(
        cold_dir = %config.storage.cold_dir.display(),
        hot_threshold_secs = config.migration.hot_threshold_secs,
        cold_threshold_secs = config.migration.cold_threshold_secs,
        "tierstore started"
    );

    let cancel = CancellationToken::new();
    let worker = migrator.start(cancel.clone());

    shutdown_signal().await;
    shutdown(&migrator, cancel, worker).await?;

    info!("tierstore shutdown complete");
    Ok(())
}

/// Stop the migrator, then move the volatile hot tier onto disk.
async fn shutdown(
    migrator: &Migrator,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
) -> anyhow::Result<()> {
    cancel.cancel();
    worker.await.context("migrator worker panicked")?;

    let report = migrator.drain().await.context("draining hot tier")?;
    if report.failed > 0 {
        anyhow::bail!(
            "{} hot records could not be written to the cold tier",
            report.failed
        );
    }
    Ok(())
}

async fn inspect(config: TierStoreConfig) -> anyhow::Result<()> {
    let (_, cold) = open_tiers(&config).await?;
    let records = cold.list().await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
    }
}
