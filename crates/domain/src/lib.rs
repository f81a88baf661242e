//! # fanlog-domain
//!
//! Pure data model of the fanlog facade:
//!
//! - **Severity** - fixed five-level scale with numeric ranks
//! - **Context** - named key/value groups attached to events
//! - **Event** - immutable `StructuredEvent` and attached errors
//! - **Stack** - call stacks and the filter trimming facade frames
//! - **Primitives** - validated destination names
//! - **Message** - separator-less message concatenation (`msg!`)
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O; stack capture lives in the facade

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use fanlog_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod context;
pub mod event;
pub mod message;
pub mod primitives;
pub mod severity;
pub mod stack;

pub use context::{
    ContextGroup, ContextGroups, ContextValue, DEFAULT_CONTEXT, RESERVED_GROUPS,
    environment_contexts, is_reserved_group,
};
pub use event::{AttachedError, LOGGER_NAME, StructuredEvent, error_chain_text};
pub use message::concat_message;
pub use primitives::{DestinationName, PrimitiveError};
pub use severity::Severity;
pub use stack::{CallStack, StackFilter, StackFrame};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_reexports_are_available() {
        assert_eq!(Severity::ALL.len(), 5);
        assert!(!domain_crate_version().is_empty());
        assert_eq!(shared_crate_version(), domain_crate_version());
    }
}
