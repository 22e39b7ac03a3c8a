//! # Runtime Configuration
//!
//! CLI flags for both binaries. Every flag falls back to an `LC_*`
//! environment variable, then to the documented default.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use lc_02_issuer::IssuerConfig;
use lc_03_holder_agent::AgentConfig;
use thiserror::Error;

/// Configuration errors raised while assembling runtime config.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("Holder identity not set: pass --holder-id, set LC_HOLDER_ID or HOSTNAME")]
    MissingHolderId,

    #[error(transparent)]
    Agent(#[from] lc_03_holder_agent::ConfigError),

    #[error(transparent)]
    Issuer(#[from] lc_02_issuer::ConfigError),
}

/// Lease issuer.
#[derive(Parser, Debug, Clone)]
#[command(name = "lease-issuer")]
#[command(about = "Issues, tracks and revokes concurrency-capped license leases")]
#[command(version)]
pub struct IssuerArgs {
    /// Address to listen on
    #[arg(long, env = "LC_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Maximum ACTIVE leases per owner
    #[arg(long, env = "LC_MAX_ACTIVE_PER_OWNER", default_value_t = 2)]
    pub max_active_per_owner: usize,
}

impl IssuerArgs {
    pub fn issuer_config(&self) -> Result<IssuerConfig, RuntimeConfigError> {
        let config = IssuerConfig {
            max_active_per_owner: self.max_active_per_owner,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Lease holder.
#[derive(Parser, Debug, Clone)]
#[command(name = "lease-holder")]
#[command(about = "Holds one license lease and proves liveness to the issuer")]
#[command(version)]
pub struct HolderArgs {
    /// Issuer base URL
    #[arg(long, env = "LC_ISSUER_URL", default_value = "http://127.0.0.1:5000")]
    pub issuer_url: String,

    /// Owner requesting the lease
    #[arg(long, env = "LC_OWNER", default_value = "tester")]
    pub owner: String,

    /// Owner credential
    #[arg(long, env = "LC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Holder identity (defaults to the host name)
    #[arg(long, env = "LC_HOLDER_ID")]
    pub holder_id: Option<String>,

    /// Seconds between checkins
    #[arg(long, env = "LC_CHECKIN_INTERVAL_SECS", default_value_t = 10)]
    pub checkin_interval_secs: u64,

    /// Shut down once consecutive failures exceed this
    #[arg(long, env = "LC_MAX_CHECKIN_FAILURE", default_value_t = 1)]
    pub max_checkin_failure: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "LC_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// Address for the status endpoint
    #[arg(long, env = "LC_STATUS_BIND", default_value = "0.0.0.0:9090")]
    pub status_bind: SocketAddr,
}

impl HolderArgs {
    pub fn agent_config(&self) -> Result<AgentConfig, RuntimeConfigError> {
        let holder = match &self.holder_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => host_name().ok_or(RuntimeConfigError::MissingHolderId)?,
        };

        let mut config = AgentConfig::new(&self.issuer_url, &self.owner, holder);
        if let Some(password) = &self.password {
            config = config.with_password(password);
        }
        config.checkin_interval = Duration::from_secs(self.checkin_interval_secs);
        config.max_checkin_failure = self.max_checkin_failure;
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        config.validate()?;
        Ok(config)
    }
}

/// Container identity: `HOSTNAME`, then `/etc/hostname`.
fn host_name() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
