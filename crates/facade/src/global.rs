//! Process-wide registry behind the package-level functions.
//!
//! The instance is created on first use with the default `console`
//! destination, unless [`init`] or [`init_from_config`] installed one before.

use crate::builder::ContextBuilder;
use crate::registry::Registry;
use fanlog_config::{DestinationConfig, ValidatedFacadeConfig};
use fanlog_domain::{ContextValue, Severity};
use fanlog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::error::Error;
use std::sync::OnceLock;
use std::time::Duration;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::with_console)
}

/// Install `registry` as the process-wide instance.
///
/// Fails once the instance exists, including after any package-level call.
pub fn init(registry: Registry) -> Result<()> {
    GLOBAL.set(registry).map_err(|_| {
        ErrorEnvelope::expected(
            ErrorCode::new("registry", "already_initialized"),
            "process-wide registry is already initialized",
        )
    })
}

/// Build the process-wide instance from a validated config.
pub fn init_from_config(config: &ValidatedFacadeConfig) -> Result<()> {
    init(Registry::from_config(config)?)
}

/// See [`Registry::add_destination`].
pub fn add_destination(name: &str, config: &DestinationConfig) -> Result<()> {
    global().add_destination(name, config)
}

/// See [`Registry::remove_destination`].
pub fn remove_destination(name: &str) {
    global().remove_destination(name);
}

/// See [`Registry::set_threshold`].
pub fn set_threshold(name: &str, threshold: Severity) {
    global().set_threshold(name, threshold);
}

/// Start a builder on the process-wide registry.
pub fn begin(group: &str) -> ContextBuilder<'static> {
    global().begin(group)
}

/// Shortcut for `begin("Default Context").set(key, value)`.
pub fn set(key: impl Into<String>, value: impl Into<ContextValue>) -> ContextBuilder<'static> {
    global().set(key, value)
}

/// DEBUG event without context.
pub fn debug(message: impl Into<String>) {
    global().debug(message);
}

/// INFO event without context.
pub fn info(message: impl Into<String>) {
    global().info(message);
}

/// WARN event without context.
pub fn warn(message: impl Into<String>) {
    global().warn(message);
}

/// ERROR event with `error` attached.
pub fn error<E>(error: &E, message: impl Into<String>)
where
    E: Error + ?Sized,
{
    global().error(error, message);
}

/// FATAL event; flushes and terminates the process.
pub fn fatal<E>(error: &E, message: impl Into<String>)
where
    E: Error + ?Sized,
{
    global().fatal(error, message);
}

/// See [`Registry::flush`].
pub fn flush(timeout: Duration) -> bool {
    global().flush(timeout)
}
