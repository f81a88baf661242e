//! # fanlog-shared
//!
//! The [`ErrorEnvelope`] every fanlog crate returns, plus the [`Result`] alias
//! built on it. No workspace dependencies.

pub mod errors;
pub mod result;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
