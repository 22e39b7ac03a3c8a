//! Holder status endpoint.
//!
//! Served next to the heartbeat, never in front of it: handlers only read
//! the latest snapshot published by the checkin worker.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::watch;

use crate::agent::AgentSnapshot;

type Snapshots = watch::Receiver<AgentSnapshot>;

/// `GET /status`, `GET /health`, `GET /metrics`.
pub fn status_router(snapshots: Snapshots) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(snapshots)
}

async fn status(State(snapshots): State<Snapshots>) -> Json<AgentSnapshot> {
    Json(snapshots.borrow().clone())
}

async fn health(State(snapshots): State<Snapshots>) -> Response {
    let snapshot = snapshots.borrow().clone();
    let code = if snapshot.is_active() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = Json(serde_json::json!({
        "status": if snapshot.is_active() { "healthy" } else { "unhealthy" },
        "state": snapshot.state,
        "consecutive_failures": snapshot.consecutive_failures,
        "service": "lease-holder",
        "version": env!("CARGO_PKG_VERSION")
    }));
    (code, body).into_response()
}

async fn metrics() -> Response {
    match lease_telemetry::encode_metrics() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
