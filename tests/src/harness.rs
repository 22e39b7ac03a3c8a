//! Test doubles for the holder's issuer port.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lc_01_lease_store::FailingLeaseStore;
use lc_02_issuer::{IssuerApi, IssuerConfig, IssuerError, IssuerService};
use lc_03_holder_agent::{AgentError, AgentResult, IssuerClient};
use lease_types::{
    CheckinRequest, CheckinResponse, ErrorBody, FixedTimeSource, GrantRequest, LeaseId, LeaseView,
    PatchLeaseRequest,
};
use parking_lot::Mutex;

/// Calls an [`IssuerApi`] directly, mapping errors the way the HTTP adapter
/// renders them.
pub struct InProcessIssuer {
    api: Arc<dyn IssuerApi>,
}

impl InProcessIssuer {
    pub fn new(api: Arc<dyn IssuerApi>) -> Self {
        Self { api }
    }

    /// Issuer over a fault-capable store and a fixed clock.
    pub fn with_store(
        store: Arc<FailingLeaseStore>,
        clock: Arc<FixedTimeSource>,
        config: IssuerConfig,
    ) -> Self {
        let service = IssuerService::with_parts(
            store,
            Arc::new(lc_02_issuer::AllowAllAuthenticator),
            clock,
            config,
        );
        Self::new(Arc::new(service))
    }

    pub fn api(&self) -> &Arc<dyn IssuerApi> {
        &self.api
    }
}

fn to_agent_error(err: IssuerError) -> AgentError {
    let status = err.status_code();
    AgentError::from_status(
        status,
        Some(ErrorBody {
            status,
            error: err.kind().to_string(),
            message: err.to_string(),
        }),
    )
}

#[async_trait]
impl IssuerClient for InProcessIssuer {
    async fn grant(&self, request: &GrantRequest) -> AgentResult<LeaseView> {
        self.api.grant(request.clone()).await.map_err(to_agent_error)
    }

    async fn checkin(&self, id: LeaseId, request: &CheckinRequest) -> AgentResult<CheckinResponse> {
        let ciphertext = request
            .ciphertext_bytes()
            .map_err(|e| AgentError::BadRequest {
                status: 400,
                message: e.to_string(),
            })?;
        let echo = self
            .api
            .checkin(id, &request.holder, &ciphertext)
            .await
            .map_err(to_agent_error)?;
        Ok(CheckinResponse::new(&echo))
    }

    async fn revoke(&self, id: LeaseId, request: &PatchLeaseRequest) -> AgentResult<LeaseView> {
        self.api
            .patch(id, request.clone())
            .await
            .map_err(to_agent_error)
    }
}

/// Injected failure for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with this 5xx (or any) status without reaching the issuer.
    Status(u16),
    /// Fail at the connection level without reaching the issuer.
    DropConnection,
    /// Reach the issuer, then flip a bit in the returned echo.
    TamperEcho,
}

/// Wraps an [`InProcessIssuer`] and injects scripted faults.
///
/// Scripted faults are consumed first; after that the standing outage (if
/// any) applies to every call.
pub struct FaultyIssuer {
    inner: InProcessIssuer,
    checkin_script: Mutex<VecDeque<Option<Fault>>>,
    checkin_outage: Mutex<Option<Fault>>,
    release_script: Mutex<VecDeque<Fault>>,
    checkin_calls: AtomicUsize,
    delivered_checkins: AtomicUsize,
    release_calls: AtomicUsize,
}

impl FaultyIssuer {
    pub fn new(inner: InProcessIssuer) -> Self {
        Self {
            inner,
            checkin_script: Mutex::new(VecDeque::new()),
            checkin_outage: Mutex::new(None),
            release_script: Mutex::new(VecDeque::new()),
            checkin_calls: AtomicUsize::new(0),
            delivered_checkins: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }

    pub fn api(&self) -> &Arc<dyn IssuerApi> {
        self.inner.api()
    }

    /// Queue per-call checkin behaviour; `None` passes the call through.
    pub fn script_checkins(&self, script: &[Option<Fault>]) {
        self.checkin_script.lock().extend(script.iter().copied());
    }

    pub fn set_checkin_outage(&self, fault: Option<Fault>) {
        *self.checkin_outage.lock() = fault;
    }

    pub fn script_releases(&self, script: &[Fault]) {
        self.release_script.lock().extend(script.iter().copied());
    }

    /// Checkins the holder attempted.
    pub fn checkin_calls(&self) -> usize {
        self.checkin_calls.load(Ordering::SeqCst)
    }

    /// Checkins that reached the issuer.
    pub fn delivered_checkins(&self) -> usize {
        self.delivered_checkins.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    fn next_checkin_fault(&self) -> Option<Fault> {
        match self.checkin_script.lock().pop_front() {
            Some(scripted) => scripted,
            None => *self.checkin_outage.lock(),
        }
    }
}

fn injected(fault: Fault) -> AgentError {
    match fault {
        Fault::Status(status) => AgentError::from_status(status, None),
        Fault::DropConnection => AgentError::TransportError("connection reset by peer".into()),
        Fault::TamperEcho => AgentError::ProtocolMismatch,
    }
}

#[async_trait]
impl IssuerClient for FaultyIssuer {
    async fn grant(&self, request: &GrantRequest) -> AgentResult<LeaseView> {
        self.inner.grant(request).await
    }

    async fn checkin(&self, id: LeaseId, request: &CheckinRequest) -> AgentResult<CheckinResponse> {
        self.checkin_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_checkin_fault() {
            Some(Fault::TamperEcho) => {
                self.delivered_checkins.fetch_add(1, Ordering::SeqCst);
                let response = self.inner.checkin(id, request).await?;
                let mut echo = response
                    .echo_bytes()
                    .map_err(|e| AgentError::Decode(e.to_string()))?;
                if let Some(first) = echo.first_mut() {
                    *first ^= 0x01;
                }
                Ok(CheckinResponse::new(&echo))
            }
            Some(fault) => Err(injected(fault)),
            None => {
                self.delivered_checkins.fetch_add(1, Ordering::SeqCst);
                self.inner.checkin(id, request).await
            }
        }
    }

    async fn revoke(&self, id: LeaseId, request: &PatchLeaseRequest) -> AgentResult<LeaseView> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let fault = self.release_script.lock().pop_front();
        match fault {
            Some(fault) => Err(injected(fault)),
            None => self.inner.revoke(id, request).await,
        }
    }
}
