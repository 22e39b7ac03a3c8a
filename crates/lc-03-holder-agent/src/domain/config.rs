//! # Agent Configuration
//!
//! Defaults follow the reference policy: check in every 10 seconds, shut
//! down after more than one consecutive failure, back off 30 seconds after a
//! transport failure.

use std::time::Duration;

use super::errors::ConfigError;

pub const DEFAULT_CHECKIN_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CHECKIN_FAILURE: u32 = 1;
pub const DEFAULT_TRANSPORT_BACKOFF: Duration = Duration::from_secs(30);
pub const DEFAULT_SERVER_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_SERVER_RETRIES: u32 = 3;
pub const DEFAULT_RELEASE_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Holder agent configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Issuer base URL, e.g. `http://issuer:8080`
    pub issuer_url: String,
    /// Requesting principal
    pub owner: String,
    /// Owner credential forwarded with the grant request
    pub password: Option<String>,
    /// Identity of this process (container / host)
    pub holder: String,
    /// Heartbeat period
    pub checkin_interval: Duration,
    /// Shut down once consecutive failures exceed this value
    pub max_checkin_failure: u32,
    /// Sleep after a transport failure before the next attempt
    pub transport_backoff: Duration,
    /// Sleep between 5xx retries within one tick
    pub server_backoff: Duration,
    /// 5xx retries per tick after the first attempt
    pub max_server_retries: u32,
    /// Sleep between release attempts
    pub release_backoff: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl AgentConfig {
    /// Configuration with default timings.
    pub fn new(
        issuer_url: impl Into<String>,
        owner: impl Into<String>,
        holder: impl Into<String>,
    ) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            owner: owner.into(),
            password: None,
            holder: holder.into(),
            checkin_interval: DEFAULT_CHECKIN_INTERVAL,
            max_checkin_failure: DEFAULT_MAX_CHECKIN_FAILURE,
            transport_backoff: DEFAULT_TRANSPORT_BACKOFF,
            server_backoff: DEFAULT_SERVER_BACKOFF,
            max_server_retries: DEFAULT_MAX_SERVER_RETRIES,
            release_backoff: DEFAULT_RELEASE_BACKOFF,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.issuer_url.starts_with("http://") || self.issuer_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "issuer_url",
                reason: format!("expected an http(s) URL, got {:?}", self.issuer_url),
            });
        }
        if self.owner.trim().is_empty() {
            return Err(ConfigError::Missing { field: "owner" });
        }
        if self.holder.trim().is_empty() {
            return Err(ConfigError::Missing { field: "holder" });
        }
        for (field, value) in [
            ("checkin_interval", self.checkin_interval),
            ("request_timeout", self.request_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}
