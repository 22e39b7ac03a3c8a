//! Holder ports.

pub mod outbound;
