//! # Protocol Flows
//!
//! Holder agent against the issuer service, no faults injected.

use std::time::Duration;

use lc_01_lease_store::LeaseQuery;
use lc_02_issuer::IssuerConfig;
use lc_03_holder_agent::{AgentError, ExitReason, HeartbeatScheduler, HolderState, TickOutcome};
use lease_types::{LeaseStatus, TimeSource};
use tokio::sync::watch;

use super::fixtures::Fixture;

#[tokio::test]
async fn test_acquire_checkin_release() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    let (_tx, mut rx) = watch::channel(false);

    fx.clock.advance_secs(10);
    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);

    let view = fx.issuer.api().get(id).await.unwrap();
    assert_eq!(view.last_checkin_at, Some(fx.clock.now()));
    assert_eq!(view.holder, "c1");

    agent.release(&mut rx).await.unwrap();
    assert_eq!(agent.state(), HolderState::Released);

    let view = fx.issuer.api().get(id).await.unwrap();
    assert_eq!(view.status, LeaseStatus::Revoked);
    assert!(view.revoked_at.is_some());
}

#[tokio::test]
async fn test_third_holder_for_owner_fails_to_start() {
    let fx = Fixture::new();
    let mut first = fx.agent("c1", 1);
    let mut second = fx.agent("c2", 1);
    let mut third = fx.agent("c3", 1);

    first.acquire().await.unwrap();
    second.acquire().await.unwrap();
    let err = third.acquire().await.unwrap_err();

    assert!(matches!(err, AgentError::QuotaExceeded { .. }));
    assert_eq!(third.state(), HolderState::FailedStart);

    // Releasing one frees a slot
    let (_tx, mut rx) = watch::channel(false);
    first.release(&mut rx).await.unwrap();
    let mut fourth = fx.agent("c4", 1);
    assert!(fourth.acquire().await.is_ok());
}

#[tokio::test]
async fn test_custom_cap() {
    let fx = Fixture::with_config(IssuerConfig {
        max_active_per_owner: 1,
    });
    fx.agent("c1", 1).acquire().await.unwrap();
    assert!(fx.agent("c2", 1).acquire().await.is_err());
}

#[tokio::test]
async fn test_revoked_lease_checkin_is_forbidden() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();

    fx.issuer.api().revoke(id).await.unwrap();

    let err = agent.checkin_once().await.unwrap_err();
    assert!(matches!(err, AgentError::Forbidden { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_two_forbidden_checkins_trip_threshold() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    fx.issuer.api().revoke(id).await.unwrap();

    let (_tx, rx) = watch::channel(false);
    let (agent, reason) = HeartbeatScheduler::new(agent).run(rx).await;

    assert_eq!(reason, ExitReason::FailureThreshold { failures: 2 });
    assert_eq!(fx.issuer.checkin_calls(), 2);
    assert_eq!(agent.tracker().total_failures(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_healthy_heartbeat_keeps_lease_fresh() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();

    let (tx, rx) = watch::channel(false);
    let scheduler = HeartbeatScheduler::new(agent);
    let snapshots = scheduler.subscribe();
    let handle = tokio::spawn(scheduler.run(rx));

    tokio::time::sleep(Duration::from_secs(55)).await;
    tx.send(true).unwrap();
    let (mut agent, reason) = handle.await.unwrap();

    assert_eq!(reason, ExitReason::Shutdown);
    assert_eq!(fx.issuer.checkin_calls(), 5);
    assert_eq!(snapshots.borrow().successful_checkins, 5);
    assert_eq!(snapshots.borrow().lease_id, Some(id));

    let (_abort_tx, mut abort) = watch::channel(false);
    agent.release(&mut abort).await.unwrap();
    let active = fx
        .issuer
        .api()
        .list(LeaseQuery::active_for_owner("tester"))
        .await
        .unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn test_release_of_deleted_lease_is_fatal() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    fx.issuer.api().delete(id).await.unwrap();

    let (_tx, mut abort) = watch::channel(false);
    let err = agent.release(&mut abort).await.unwrap_err();
    assert!(matches!(err, AgentError::NotFound { .. }));
    assert_eq!(fx.issuer.release_calls(), 1);
}
