//! Holder adapters: reqwest issuer client and the local status endpoint.

pub mod http_client;
pub mod status;
