//! # Fault Injection
//!
//! Scripted issuer failures between the holder and a real issuer service.

use std::time::Duration;

use lc_03_holder_agent::{AgentError, ExitReason, HeartbeatScheduler, TickOutcome};
use lease_types::TimeSource;
use tokio::sync::watch;
use tokio::time::Instant;

use super::fixtures::Fixture;
use crate::harness::Fault;

#[tokio::test(start_paused = true)]
async fn test_500_then_success_touches_lease_once() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    // The first attempt reaches the issuer and fails on the store write
    fx.store.set_fail_writes(true);
    let (_tx, mut rx) = watch::channel(false);

    fx.clock.advance_secs(10);
    let first_attempt = fx.clock.now();
    let (store, clock) = (fx.store.clone(), fx.clock.clone());
    let recover = tokio::spawn(async move {
        // Inside the 5s server backoff
        tokio::time::sleep(Duration::from_secs(1)).await;
        store.set_fail_writes(false);
        clock.advance_secs(5);
    });

    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);
    recover.await.unwrap();

    assert_eq!(agent.tracker().consecutive_failures(), 0);
    assert_eq!(fx.issuer.checkin_calls(), 2);
    assert_eq!(fx.issuer.delivered_checkins(), 2);
    assert_eq!(fx.store.applied_touches(), 1);
    let view = fx.issuer.api().get(id).await.unwrap();
    assert_eq!(view.last_checkin_at, Some(fx.clock.now()));
    assert_ne!(view.last_checkin_at, Some(first_attempt));
}

#[tokio::test(start_paused = true)]
async fn test_injected_500_is_never_delivered() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    agent.acquire().await.unwrap();
    fx.issuer.script_checkins(&[Some(Fault::Status(500)), None]);
    let (_tx, mut rx) = watch::channel(false);

    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);
    assert_eq!(fx.issuer.checkin_calls(), 2);
    assert_eq!(fx.issuer.delivered_checkins(), 1);
    assert_eq!(fx.store.applied_touches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_store_outage_exhausts_retries() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 5);
    agent.acquire().await.unwrap();
    // A real 500 from the issuer, not an injected one
    fx.store.set_fail_writes(true);
    let (_tx, mut rx) = watch::channel(false);

    let start = Instant::now();
    let outcome = agent.run_tick(&mut rx).await;

    assert!(matches!(
        outcome,
        TickOutcome::Failed(AgentError::TransientServerError { status: 500, .. })
    ));
    assert_eq!(agent.tracker().consecutive_failures(), 1);
    assert_eq!(fx.issuer.delivered_checkins(), 4);
    assert!(start.elapsed() >= Duration::from_secs(15));

    fx.store.set_fail_writes(false);
    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);
    assert_eq!(agent.tracker().consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_tampered_echo_is_counted() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    agent.acquire().await.unwrap();
    fx.issuer.script_checkins(&[Some(Fault::TamperEcho)]);
    let (_tx, mut rx) = watch::channel(false);

    assert_eq!(
        agent.run_tick(&mut rx).await,
        TickOutcome::Failed(AgentError::ProtocolMismatch)
    );
    assert_eq!(fx.issuer.delivered_checkins(), 1);
    assert_eq!(agent.tracker().consecutive_failures(), 1);

    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);
    assert_eq!(agent.tracker().consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_tampering_shuts_holder_down() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    agent.acquire().await.unwrap();
    fx.issuer.set_checkin_outage(Some(Fault::TamperEcho));
    let (_tx, rx) = watch::channel(false);

    let (_, reason) = HeartbeatScheduler::new(agent).run(rx).await;
    assert_eq!(reason, ExitReason::FailureThreshold { failures: 2 });
    assert_eq!(fx.issuer.checkin_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_connection_backs_off_without_burst() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 10);
    agent.acquire().await.unwrap();
    fx.issuer.set_checkin_outage(Some(Fault::DropConnection));
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(HeartbeatScheduler::new(agent).run(rx));
    tokio::time::sleep(Duration::from_secs(65)).await;
    tx.send(true).unwrap();
    let (agent, reason) = handle.await.unwrap();

    assert_eq!(reason, ExitReason::Shutdown);
    // Attempts at 10s and 40s; the second backoff is cut short by shutdown
    assert_eq!(fx.issuer.checkin_calls(), 2);
    assert_eq!(fx.issuer.delivered_checkins(), 0);
    assert_eq!(agent.tracker().consecutive_failures(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_recovery_after_outage() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 3);
    agent.acquire().await.unwrap();
    fx.issuer.script_checkins(&[
        Some(Fault::DropConnection),
        Some(Fault::Status(502)),
        Some(Fault::Status(502)),
        Some(Fault::Status(502)),
        Some(Fault::Status(502)),
    ]);
    let (_tx, mut rx) = watch::channel(false);

    assert!(matches!(
        agent.run_tick(&mut rx).await,
        TickOutcome::Failed(AgentError::TransportError(_))
    ));
    assert!(matches!(
        agent.run_tick(&mut rx).await,
        TickOutcome::Failed(AgentError::TransientServerError { status: 502, .. })
    ));
    assert_eq!(agent.tracker().consecutive_failures(), 2);
    assert!(!agent.threshold_exceeded());

    assert_eq!(agent.run_tick(&mut rx).await, TickOutcome::Success);
    assert_eq!(agent.tracker().consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_release_survives_transient_failures() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    fx.issuer
        .script_releases(&[Fault::Status(503), Fault::DropConnection, Fault::Status(500)]);
    let (_tx, mut abort) = watch::channel(false);

    let start = Instant::now();
    agent.release(&mut abort).await.unwrap();

    assert_eq!(fx.issuer.release_calls(), 4);
    assert!(start.elapsed() >= Duration::from_secs(15));
    assert!(fx.issuer.api().get(id).await.unwrap().revoked_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_release_abort_leaves_lease_active() {
    let fx = Fixture::new();
    let mut agent = fx.agent("c1", 1);
    let id = agent.acquire().await.unwrap().id();
    fx.issuer.script_releases(&[Fault::DropConnection; 50]);
    let (tx, mut abort) = watch::channel(false);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        tx.send(true).unwrap();
    });

    let err = agent.release(&mut abort).await.unwrap_err();
    assert!(err.is_transport());
    assert!(fx.issuer.api().get(id).await.unwrap().revoked_at.is_none());
}
