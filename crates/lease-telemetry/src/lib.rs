//! # Lease Telemetry
//!
//! Logging and metrics shared by the issuer and holder processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lease_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::for_service("lease-issuer"))?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LC_SERVICE_NAME` | binary name | Service name attached to log lines |
//! | `LC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LC_JSON_LOGS` | `true` in containers | JSON instead of pretty output |
//! | `LC_CONSOLE_OUTPUT` | `true` | Emit log lines to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, HOLDER_CHECKINS,
    HOLDER_CHECKIN_DURATION, HOLDER_CONSECUTIVE_FAILURES, ISSUER_CHECKINS, ISSUER_GRANTS,
    ISSUER_REVOCATIONS, LEASES_ACTIVE,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global subscriber.
///
/// The returned guard should be held for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;
    Ok(TelemetryGuard {
        service: config.service_name.clone(),
        _metrics: metrics,
    })
}

/// Keeps telemetry alive; logs a final line on drop.
pub struct TelemetryGuard {
    service: String,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry");
    }
}
