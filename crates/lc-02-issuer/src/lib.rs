//! # Lease Issuer (lc-02)
//!
//! Grants leases, validates challenge checkins and revokes leases. The
//! issuer is the only party holding a lease's secret key, so it is the only
//! party that can open a sealed challenge and echo it back.
//!
//! ## Request Flow
//!
//! ```text
//! POST /licenses ─────────→ grant   ──→ quota check + insert (atomic) ──→ 201 LeaseView
//! POST /licenses/{id}/checkin → checkin ──→ holder/status check
//!                                        ──→ open sealed challenge
//!                                        ──→ touch last_checkin_at (CAS) ──→ 200 echo
//! PATCH /licenses/{id} ──────→ revoke  ──→ ACTIVE → REVOKED (idempotent)
//! ```
//!
//! ## Error Mapping
//!
//! | Error | HTTP |
//! |-------|------|
//! | `QuotaExceeded` | 403 |
//! | `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | `Forbidden` | 403 |
//! | `BadRequest` | 400 |
//! | `Store` | 500 |
//!
//! The issuer never retries internally; retry cadence belongs to the holder.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::{router, ApiError};
pub use domain::config::IssuerConfig;
pub use domain::errors::{ConfigError, ForbiddenReason, IssuerError, IssuerResult};
pub use ports::inbound::IssuerApi;
pub use ports::outbound::{AllowAllAuthenticator, Authenticator};
pub use service::IssuerService;
