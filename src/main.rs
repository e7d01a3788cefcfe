//! Loki Bridge Server
//!
//! Run with: cargo run -- [--config path/to/config.toml]
//!
//! # Configuration
//!
//! Read from `--config`, or the first of
//! `~/.config/loki-bridge/config.toml`, `/etc/loki-bridge/config.toml`,
//! `./config.toml`. Environment variables override file values:
//! - `LOKI_BRIDGE_HOST`, `LOKI_BRIDGE_PORT`: listen address
//! - `LOKI_BRIDGE_BACKEND_URL`: VictoriaLogs query endpoint
//! - `LOKI_BRIDGE_LOG_LEVEL`, `LOKI_BRIDGE_LOG_FORMAT`: logging
//! - `RUST_LOG`: full filter directive, wins over the configured level

use anyhow::Context;
use clap::Parser;
use loki_bridge::api::{serve, AppState};
use loki_bridge::backend::VictoriaLogsClient;
use loki_bridge::config::{generate_default_config, Config, LoggingConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loki-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loki-compatible query front-end for VictoriaLogs")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a commented default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let (config, report) = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);
    report.log();

    tracing::info!("Starting Loki bridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("VictoriaLogs endpoint: {}", config.backend.url);

    let backend = VictoriaLogsClient::new(config.backend.client_config())
        .context("Failed to create VictoriaLogs client")?;

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let api_config = config.api_config();
    let state = AppState::new(Arc::new(backend), api_config.clone()).with_metrics(metrics_handle);

    serve(state, &api_config).await?;

    tracing::info!("Loki bridge stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("loki_bridge={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
