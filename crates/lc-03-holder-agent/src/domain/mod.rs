//! Holder domain: configuration, error classification, failure tracking.

pub mod config;
pub mod errors;
pub mod tracker;
