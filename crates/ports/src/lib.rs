//! # fanlog-ports
//!
//! Port traits for the fanlog hexagonal architecture.
//!
//! This crate defines the interfaces between the registry and concrete
//! delivery adapters. It depends only on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod remote;
pub mod sink;
pub mod transport;

pub use remote::*;
pub use sink::*;
pub use transport::*;

// Domain types used in the transport and remote sink signatures.
pub use fanlog_domain::{Severity, StructuredEvent};
