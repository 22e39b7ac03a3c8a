//! Issuer policy.

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// Default number of ACTIVE leases one owner may hold.
pub const DEFAULT_MAX_ACTIVE_PER_OWNER: usize = 2;

/// Issuer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Concurrency cap enforced at grant time.
    pub max_active_per_owner: usize,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_active_per_owner: DEFAULT_MAX_ACTIVE_PER_OWNER,
        }
    }
}

impl IssuerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_active_per_owner == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_active_per_owner",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cap_is_two() {
        let config = IssuerConfig::default();
        assert_eq!(config.max_active_per_owner, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let config = IssuerConfig {
            max_active_per_owner: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "max_active_per_owner",
                ..
            })
        ));
    }
}
