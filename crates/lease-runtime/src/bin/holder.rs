//! `lease-holder`: acquires a lease, proves liveness, releases on shutdown.

use std::process::ExitCode;

use clap::Parser;
use lease_runtime::{run_holder, HolderArgs, ShutdownController};
use lease_telemetry::{init_telemetry, TelemetryConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = HolderArgs::parse();

    let _telemetry = match init_telemetry(&TelemetryConfig::for_service("lease-holder")) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("FATAL: telemetry initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{:#}", e), "FATAL");
            eprintln!("FATAL: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: HolderArgs) -> anyhow::Result<bool> {
    let config = args.agent_config()?;
    let status = TcpListener::bind(args.status_bind).await?;

    info!(
        issuer = %config.issuer_url,
        owner = %config.owner,
        holder = %config.holder,
        "Lease Holder v{}",
        env!("CARGO_PKG_VERSION")
    );

    let controller = ShutdownController::new();
    let shutdown = controller.shutdown_signal();
    let abort = controller.abort_signal();
    let _signals = controller.listen();

    let exit = run_holder(config, Some(status), shutdown, abort).await?;
    if exit.is_success() {
        info!("{}", exit.describe());
    } else {
        error!("FATAL: {}", exit.describe());
        eprintln!("FATAL: {}", exit.describe());
    }
    Ok(exit.is_success())
}
