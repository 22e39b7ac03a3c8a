//! reqwest implementation of [`IssuerClient`].

use std::time::Duration;

use async_trait::async_trait;
use lease_types::{
    CheckinRequest, CheckinResponse, ErrorBody, GrantRequest, LeaseId, LeaseView,
    PatchLeaseRequest,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::domain::errors::{AgentError, AgentResult};
use crate::ports::outbound::IssuerClient;

/// Issuer client over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpIssuerClient {
    client: Client,
    base_url: String,
}

impl HttpIssuerClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AgentError::TransportError(format!("client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> AgentResult<R> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                AgentError::TransportError(format!("cannot connect to {}", self.base_url))
            } else {
                AgentError::TransportError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are best effort; a proxy may answer with HTML.
            let body = response.json::<ErrorBody>().await.ok();
            return Err(AgentError::from_status(status.as_u16(), body));
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_decode() {
                AgentError::Decode(e.to_string())
            } else {
                AgentError::TransportError(e.to_string())
            }
        })
    }
}

#[async_trait]
impl IssuerClient for HttpIssuerClient {
    async fn grant(&self, request: &GrantRequest) -> AgentResult<LeaseView> {
        self.send(self.client.post(self.url("/licenses")).json(request))
            .await
    }

    async fn checkin(&self, id: LeaseId, request: &CheckinRequest) -> AgentResult<CheckinResponse> {
        let url = self.url(&format!("/licenses/{}/checkin", id));
        self.send(self.client.post(url).json(request)).await
    }

    async fn revoke(&self, id: LeaseId, request: &PatchLeaseRequest) -> AgentResult<LeaseView> {
        let url = self.url(&format!("/licenses/{}", id));
        self.send(self.client.patch(url).json(request)).await
    }
}
