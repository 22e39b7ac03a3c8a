//! Issuer wiring: store, service, router, server.

use std::sync::Arc;

use anyhow::{Context, Result};
use lc_01_lease_store::InMemoryLeaseStore;
use lc_02_issuer::{router, IssuerConfig, IssuerService};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// Serve the issuer on `listener` until `shutdown` turns `true`.
pub async fn serve_issuer(
    listener: TcpListener,
    config: IssuerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    config.validate()?;

    let store = Arc::new(InMemoryLeaseStore::new());
    let service = Arc::new(IssuerService::new(store, config));

    let addr = listener.local_addr().context("listener has no local address")?;
    info!(
        %addr,
        max_active_per_owner = service.config().max_active_per_owner,
        "[lc-02] issuer listening"
    );
    let app = router(service);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .context("issuer server failed")?;

    info!("[lc-02] issuer stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = watch::channel(false);
        let server = tokio::spawn(serve_issuer(listener, IssuerConfig::default(), rx));

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/licenses", base))
            .json(&json!({"owner": "tester", "holder": "c1"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ACTIVE");

        tx.send(true).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_policy_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (_tx, rx) = watch::channel(false);
        let config = IssuerConfig {
            max_active_per_owner: 0,
        };
        assert!(serve_issuer(listener, config, rx).await.is_err());
    }
}
