//! Outbound Ports (Driven Ports)

use async_trait::async_trait;

/// Decides whether an owner may request leases.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, owner: &str, password: Option<&str>) -> bool;
}

/// Accepts every owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAuthenticator;

#[async_trait]
impl Authenticator for AllowAllAuthenticator {
    async fn authenticate(&self, _owner: &str, _password: Option<&str>) -> bool {
        true
    }
}
