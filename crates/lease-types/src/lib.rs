//! # Lease Types Crate
//!
//! Entities and wire payloads shared by every lease subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the persisted record layout (`Lease`) and the
//!   HTTP payloads are defined once, here.
//! - **Secret stays home**: `Lease` carries the issuer-side secret key for
//!   persistence, but the only outward projection (`LeaseView`) drops it.
//! - **Fixed timestamps**: all timestamps serialize as `YYYY-MM-DD HH:MM:SS`.

pub mod entities;
pub mod errors;
pub mod time;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use time::{SystemTimeSource, TimeSource, TIMESTAMP_FORMAT};
pub use wire::*;

#[cfg(any(test, feature = "test-utils"))]
pub use time::FixedTimeSource;
