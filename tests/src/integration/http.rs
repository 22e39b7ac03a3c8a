//! # Over the Wire
//!
//! Holder and issuer talking over real sockets on 127.0.0.1.

use std::time::Duration;

use lc_02_issuer::IssuerConfig;
use lc_03_holder_agent::{AgentConfig, AgentError, HttpIssuerClient, IssuerClient};
use lease_crypto::{seal_challenge, ChallengePublicKey};
use lease_runtime::{run_holder, serve_issuer, HolderExit};
use lease_types::{
    CheckinRequest, GrantRequest, LeaseView, PatchLeaseRequest, SystemTimeSource, TimeSource,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;

struct Issuer {
    url: String,
    stop: watch::Sender<bool>,
    task: tokio::task::JoinHandle<anyhow::Result<()>>,
}

async fn start_issuer() -> Issuer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (stop, rx) = watch::channel(false);
    let task = tokio::spawn(serve_issuer(listener, IssuerConfig::default(), rx));
    Issuer { url, stop, task }
}

impl Issuer {
    fn client(&self) -> HttpIssuerClient {
        HttpIssuerClient::new(&self.url, Duration::from_secs(2)).unwrap()
    }

    async fn shutdown(self) {
        self.stop.send(true).unwrap();
        self.task.await.unwrap().unwrap();
    }
}

fn grant_request(holder: &str) -> GrantRequest {
    GrantRequest {
        owner: "tester".into(),
        holder: holder.into(),
        password: None,
    }
}

#[tokio::test]
async fn test_grant_revoke_checkin_is_forbidden() {
    let issuer = start_issuer().await;
    let client = issuer.client();

    let view = client.grant(&grant_request("c1")).await.unwrap();
    client
        .revoke(view.id, &PatchLeaseRequest::revoke(&SystemTimeSource.now()))
        .await
        .unwrap();

    let public_key = ChallengePublicKey::from_bytes(view.public_key_bytes().unwrap());
    let (_, ciphertext) = seal_challenge(&public_key).unwrap();
    let request = CheckinRequest::new("c1", &ciphertext);
    let err = client.checkin(view.id, &request).await.unwrap_err();
    assert!(matches!(err, AgentError::Forbidden { .. }));

    issuer.shutdown().await;
}

#[tokio::test]
async fn test_quota_over_http() {
    let issuer = start_issuer().await;
    let client = issuer.client();

    client.grant(&grant_request("c1")).await.unwrap();
    client.grant(&grant_request("c2")).await.unwrap();
    let err = client.grant(&grant_request("c3")).await.unwrap_err();
    assert!(matches!(err, AgentError::QuotaExceeded { .. }));

    issuer.shutdown().await;
}

#[tokio::test]
async fn test_holder_mismatch_over_http() {
    let issuer = start_issuer().await;
    let client = issuer.client();
    let view = client.grant(&grant_request("c1")).await.unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/licenses/{}/checkin", issuer.url, view.id))
        .json(&json!({"holder": "intruder", "ciphertext": "not-hex"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    issuer.shutdown().await;
}

#[tokio::test]
async fn test_holder_runtime_exits_on_external_revocation() {
    let issuer = start_issuer().await;

    let mut config = AgentConfig::new(issuer.url.clone(), "tester", "c1");
    config.checkin_interval = Duration::from_millis(50);
    config.release_backoff = Duration::from_millis(50);
    let (_shutdown_tx, shutdown) = watch::channel(false);
    let (_abort_tx, abort) = watch::channel(false);
    let holder = tokio::spawn(run_holder(config, None, shutdown, abort));

    // Wait for the grant, then revoke it behind the holder's back
    let http = reqwest::Client::new();
    let lease = loop {
        let leases: Vec<LeaseView> = http
            .get(format!("{}/licenses?holder=c1", issuer.url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if let Some(lease) = leases.into_iter().next() {
            break lease;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    let response = http
        .patch(format!("{}/licenses/{}", issuer.url, lease.id))
        .json(&json!({"status": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let exit = tokio::time::timeout(Duration::from_secs(5), holder)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(
        exit,
        HolderExit::FailureThreshold {
            failures: 2,
            released: true
        }
    );
    assert!(!exit.is_success());

    issuer.shutdown().await;
}
