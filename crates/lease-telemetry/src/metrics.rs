//! Prometheus metrics for the lease issuer and holder.
//!
//! All metrics follow the naming convention: `lc_<side>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: grants, checkins and revocations by outcome
//! - **Gauge**: active leases, consecutive holder failures
//! - **Histogram**: holder checkin round trip

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ISSUER METRICS
    // =========================================================================

    /// Grant requests by outcome
    pub static ref ISSUER_GRANTS: IntCounterVec = IntCounterVec::new(
        Opts::new("lc_issuer_grants_total", "Grant requests handled by the issuer"),
        &["outcome"]  // outcome: granted/quota_exceeded/unauthorized/bad_request/store_error
    ).expect("metric creation failed");

    /// Checkins by outcome
    pub static ref ISSUER_CHECKINS: IntCounterVec = IntCounterVec::new(
        Opts::new("lc_issuer_checkins_total", "Checkins handled by the issuer"),
        &["outcome"]  // outcome: ok/not_found/forbidden/bad_request/store_error
    ).expect("metric creation failed");

    /// ACTIVE → REVOKED transitions
    pub static ref ISSUER_REVOCATIONS: IntCounter = IntCounter::new(
        "lc_issuer_revocations_total",
        "Leases transitioned to REVOKED"
    ).expect("metric creation failed");

    /// Leases currently ACTIVE
    pub static ref LEASES_ACTIVE: IntGauge = IntGauge::new(
        "lc_issuer_leases_active",
        "Number of ACTIVE leases"
    ).expect("metric creation failed");

    // =========================================================================
    // HOLDER METRICS
    // =========================================================================

    /// Checkin tick outcomes seen by the holder
    pub static ref HOLDER_CHECKINS: IntCounterVec = IntCounterVec::new(
        Opts::new("lc_holder_checkins_total", "Checkin ticks by outcome"),
        &["outcome"]  // outcome: success/client_rejection/server_error/transport/mismatch
    ).expect("metric creation failed");

    /// Consecutive failed checkins (shutdown threshold indicator)
    pub static ref HOLDER_CONSECUTIVE_FAILURES: IntGauge = IntGauge::new(
        "lc_holder_consecutive_failures",
        "Consecutive failed checkins since the last success"
    ).expect("metric creation failed");

    /// Single checkin round trip
    pub static ref HOLDER_CHECKIN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "lc_holder_checkin_duration_seconds",
            "Time spent on a single checkin request"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Handle returned by [`register_metrics`].
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Issuer
        Box::new(ISSUER_GRANTS.clone()),
        Box::new(ISSUER_CHECKINS.clone()),
        Box::new(ISSUER_REVOCATIONS.clone()),
        Box::new(LEASES_ACTIVE.clone()),
        // Holder
        Box::new(HOLDER_CHECKINS.clone()),
        Box::new(HOLDER_CONSECUTIVE_FAILURES.clone()),
        Box::new(HOLDER_CHECKIN_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
