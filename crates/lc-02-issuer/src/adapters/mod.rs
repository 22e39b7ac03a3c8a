//! Issuer adapters.

pub mod http;
