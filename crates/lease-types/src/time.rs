//! # Timestamps
//!
//! Every timestamp crossing a process boundary uses the fixed textual format
//! `YYYY-MM-DD HH:MM:SS` (UTC, second precision). Clocks are injected through
//! [`TimeSource`] so the issuer can be driven deterministically in tests.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::errors::WireError;

/// Interop timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Abstract clock.
pub trait TimeSource: Send + Sync {
    /// Current time, truncated to whole seconds.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

/// Render a timestamp in the interop format.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp in the interop format.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, WireError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| WireError::InvalidTimestamp(raw.to_string()))
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod ts_format {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<DateTime<Utc>>` fields (null when unset).
pub mod ts_format_opt {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_some(&format_timestamp(ts)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        raw.map(|r| parse_timestamp(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// A time source that returns a controllable timestamp.
///
/// ```rust
/// use lease_types::{FixedTimeSource, TimeSource};
///
/// let clock = FixedTimeSource::new(1_700_000_000);
/// clock.advance_secs(5);
/// assert_eq!(clock.now().timestamp(), 1_700_000_005);
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    secs: parking_lot::Mutex<i64>,
}

#[cfg(any(test, feature = "test-utils"))]
impl FixedTimeSource {
    /// Create a clock frozen at the given unix timestamp (seconds).
    pub fn new(secs: i64) -> Self {
        Self {
            secs: parking_lot::Mutex::new(secs),
        }
    }

    /// Move the clock forward.
    pub fn advance_secs(&self, delta: i64) {
        *self.secs.lock() += delta;
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(*self.secs.lock(), 0).unwrap_or_default()
    }
}
