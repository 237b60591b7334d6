//! salesdash-si - Sales Ingest service
//!
//! Batch entry point: resolves configuration, runs the ingest pipeline
//! once (idempotent against the stored input fingerprint), and prints the
//! dashboard metrics as JSON.

use anyhow::Result;
use clap::Parser;
use salesdash_common::config::Config;
use salesdash_si::store::SqliteMetricsStore;
use salesdash_si::Coordinator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "salesdash-si", about = "SalesDash sales ingest pipeline", version)]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the snapshot data root
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Override the SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting salesdash-si (Sales Ingest)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(data_root) = args.data_root {
        config.data_root = data_root;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    info!("Data root: {}", config.data_root.display());
    info!("Database: {}", config.database_path.display());

    let store = SqliteMetricsStore::connect(&config.database_path).await?;
    let coordinator = Coordinator::new(config, Arc::new(store));

    let report = coordinator.ensure_processed().await?;
    if report.reused {
        info!("Input unchanged; served stored metrics");
    }
    if let Some(summary) = &report.summary {
        info!(
            skipped_rows = summary.raw_rows_skipped + summary.normalization_errors,
            unresolved = summary.unresolved_linkages,
            canonical_customers = summary.canonical_customers,
            "Run summary"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report.metrics)?);
    Ok(())
}
