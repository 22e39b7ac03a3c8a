//! # Lease Protocol Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-process issuer client + fault injection
//! └── integration/
//!     ├── flows.rs      # Protocol scenarios, holder ↔ issuer
//!     ├── faults.rs     # Scripted 5xx, dropped connections, tampered echoes
//!     └── http.rs       # Same flows over real sockets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! cargo test -p lc-tests integration::faults::
//! cargo bench -p lc-tests
//! ```

pub mod harness;
pub mod integration;

pub use harness::{Fault, FaultyIssuer, InProcessIssuer};
