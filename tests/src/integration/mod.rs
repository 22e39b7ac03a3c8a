//! Cross-subsystem tests: the holder agent driving a real issuer service.

#[cfg(test)]
mod faults;
#[cfg(test)]
mod flows;
#[cfg(test)]
mod http;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use lc_01_lease_store::FailingLeaseStore;
    use lc_02_issuer::IssuerConfig;
    use lc_03_holder_agent::{AgentConfig, HolderAgent};
    use lease_types::FixedTimeSource;

    use crate::harness::{FaultyIssuer, InProcessIssuer};

    pub const T0: i64 = 1_714_557_600;

    pub struct Fixture {
        pub store: Arc<FailingLeaseStore>,
        pub clock: Arc<FixedTimeSource>,
        pub issuer: Arc<FaultyIssuer>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_config(IssuerConfig::default())
        }

        pub fn with_config(config: IssuerConfig) -> Self {
            let store = Arc::new(FailingLeaseStore::new());
            let clock = Arc::new(FixedTimeSource::new(T0));
            let inner = InProcessIssuer::with_store(store.clone(), clock.clone(), config);
            Self {
                store,
                clock,
                issuer: Arc::new(FaultyIssuer::new(inner)),
            }
        }

        pub fn agent(&self, holder: &str, max_checkin_failure: u32) -> HolderAgent<FaultyIssuer> {
            let mut config = AgentConfig::new("http://issuer.test", "tester", holder);
            config.max_checkin_failure = max_checkin_failure;
            HolderAgent::new(self.issuer.clone(), config)
        }
    }
}
