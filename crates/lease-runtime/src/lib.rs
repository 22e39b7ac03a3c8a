//! # Lease Runtime
//!
//! Wiring for the two executables.
//!
//! ## Issuer Startup
//!
//! 1. Initialize telemetry
//! 2. Validate issuer policy
//! 3. Create the record store and the issuer service
//! 4. Serve HTTP until the shutdown signal
//!
//! ## Holder Lifecycle
//!
//! ```text
//! acquire ──fail──→ exit(1)
//!    │
//!    ├──→ status endpoint ─────────────┐  (concurrent)
//!    └──→ heartbeat ──shutdown──→ release ──→ exit(0)
//!              │
//!              └──threshold──→ release (bounded) ──→ exit(1)
//! ```
//!
//! Both binaries stop on the first Ctrl+C / SIGTERM. On the holder, a second
//! signal abandons a release that is still retrying.

pub mod config;
pub mod holder;
pub mod issuer;
pub mod signal;

pub use config::{HolderArgs, IssuerArgs, RuntimeConfigError};
pub use holder::{run_holder, HolderExit};
pub use issuer::serve_issuer;
pub use signal::ShutdownController;
