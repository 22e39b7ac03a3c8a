//! `lease-issuer`: HTTP lease issuer.

use anyhow::{Context, Result};
use clap::Parser;
use lease_runtime::{serve_issuer, IssuerArgs, ShutdownController};
use lease_telemetry::{init_telemetry, TelemetryConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = IssuerArgs::parse();

    let _telemetry = init_telemetry(&TelemetryConfig::for_service("lease-issuer"))
        .context("telemetry initialization failed")?;

    let config = args.issuer_config()?;
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("cannot bind {}", args.bind))?;

    info!("===========================================");
    info!("  Lease Issuer v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let controller = ShutdownController::new();
    let shutdown = controller.shutdown_signal();
    let _signals = controller.listen();

    serve_issuer(listener, config, shutdown).await
}
