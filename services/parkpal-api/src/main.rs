//! ParkPal API Server
//!
//! Ride wait times and weather for theme-park destinations, served through a
//! hot in-process tier and a durable Redis tier.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use parkpal_api::{router, AppState, ServiceConfig};

/// ParkPal API Server
#[derive(Parser, Debug)]
#[command(name = "parkpal-api")]
#[command(about = "Theme-park ride waits and weather behind an edge cache")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8787", env = "PARKPAL_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "PARKPAL_WORKER_THREADS")]
    worker_threads: Option<usize>,

    #[command(flatten)]
    service: ServiceConfig,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting ParkPal API server");

    let mut state = AppState::new(args.service)
        .await
        .context("Failed to initialize application state")?;

    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_prometheus(handle),
        Err(e) => warn!(error = %e, "Prometheus recorder unavailable, /metrics will be empty"),
    }

    info!(
        regions = state.registry.destinations().len(),
        durable_backend = state.cache.durable_backend(),
        cache_version = %state.config.cache_version,
        "Application state ready"
    );

    let app = router(Arc::new(state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("ParkPal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")
}
