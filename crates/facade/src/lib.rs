//! # fanlog
//!
//! Structured-event logging facade. One log call builds a [`StructuredEvent`]
//! and fans it out to every named destination whose threshold admits it.
//!
//! ```no_run
//! use fanlog::{DestinationConfig, Severity, msg};
//!
//! fanlog::info("service started");
//! fanlog::begin("request").set("id", 17).warn(msg!("slow response: ", 812, "ms"));
//! fanlog::add_destination("audit", &DestinationConfig::file(Severity::Info, "audit.log"))?;
//! fanlog::remove_destination("console");
//! # Ok::<(), fanlog::ErrorEnvelope>(())
//! ```
//!
//! Applications that prefer explicit ownership create a [`Registry`] and pass
//! it to call sites instead of using the package-level functions.

/// Context builder.
pub mod builder;
pub mod factory;
pub mod global;
/// Destination registry and dispatch.
pub mod registry;
pub mod stack_capture;
pub mod terminator;

pub use builder::ContextBuilder;
pub use factory::{build_transport, remote_options, transport_init_failed};
pub use global::{
    add_destination, begin, debug, error, fatal, flush, global, info, init, init_from_config,
    remove_destination, set, set_threshold, warn,
};
pub use registry::{Registry, RegistryOptions, destination_exists};
pub use stack_capture::{INTERNAL_MODULES, capture_stack, internal_filter};
pub use terminator::{FATAL_EXIT_CODE, ProcessTerminator, Terminator};

pub use fanlog_adapters::{
    IoTransport, MemoryRemoteSink, MemorySink, NullRemoteSink, Palette, RemoteTransport, TimeStyle,
};
#[cfg(feature = "http")]
pub use fanlog_adapters::HttpRemoteSink;
pub use fanlog_config::{
    DestinationConfig, FacadeConfig, FacadeEnv, RemoteDestinationConfig, ValidatedFacadeConfig,
    load_config_from_path, load_config_std_env,
};
pub use fanlog_domain::{
    AttachedError, CallStack, ContextGroups, ContextValue, DEFAULT_CONTEXT, Severity, StackFrame,
    StructuredEvent, concat_message, msg,
};
pub use fanlog_ports::{LineSink, RemoteSink, RemoteSinkOptions, Transport};
pub use fanlog_shared::{ErrorCode, ErrorEnvelope, Result};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
