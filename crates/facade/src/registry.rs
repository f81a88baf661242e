//! Named destinations and event broadcast.
//!
//! The registry owns the name -> transport map. Structural changes take the
//! write lock; broadcasting snapshots the map under the read lock and invokes
//! transports after releasing it, so a transport may log back into the
//! registry without deadlocking.

use crate::builder::ContextBuilder;
use crate::factory::build_transport;
use crate::stack_capture::{capture_stack, internal_filter};
use crate::terminator::{FATAL_EXIT_CODE, ProcessTerminator, Terminator};
use fanlog_config::{DEFAULT_CONSOLE_NAME, DEFAULT_FLUSH_TIMEOUT_MS, DestinationConfig, ValidatedFacadeConfig};
use fanlog_domain::{
    AttachedError, ContextGroups, ContextValue, DEFAULT_CONTEXT, DestinationName, Severity,
    StackFilter, StructuredEvent, environment_contexts,
};
use fanlog_ports::Transport;
use fanlog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::error::Error;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

type TransportMap = BTreeMap<DestinationName, Arc<dyn Transport>>;

/// Error code for a name that is already registered.
#[must_use]
pub fn destination_exists() -> ErrorCode {
    ErrorCode::new("registry", "destination_exists")
}

/// Registry-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Bound on the flush performed before a fatal exit.
    pub flush_timeout: Duration,
    /// Attach `os`/`device`/`runtime` groups to every event.
    pub attach_environment: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            flush_timeout: Duration::from_millis(DEFAULT_FLUSH_TIMEOUT_MS),
            attach_environment: false,
        }
    }
}

/// Name -> transport map plus the dispatch engine.
pub struct Registry {
    destinations: RwLock<TransportMap>,
    options: RegistryOptions,
    terminator: Arc<dyn Terminator>,
    filter: StackFilter,
}

impl Default for Registry {
    /// Registry with the default `console` destination.
    fn default() -> Self {
        Self::with_console()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("destinations", &self.names())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            destinations: RwLock::new(BTreeMap::new()),
            options,
            terminator: Arc::new(ProcessTerminator),
            filter: internal_filter(),
        }
    }

    /// Registry holding only `console`: stdout/stderr at DEBUG.
    ///
    /// The default destination is registered without an announcement.
    #[must_use]
    pub fn with_console() -> Self {
        let registry = Self::new(RegistryOptions::default());
        if let Ok(name) = DestinationName::parse(DEFAULT_CONSOLE_NAME) {
            registry.write().insert(
                name,
                Arc::new(fanlog_adapters::IoTransport::console(Severity::Debug)),
            );
        }
        registry
    }

    /// Registry built from a validated config, destinations registered quietly.
    pub fn from_config(config: &ValidatedFacadeConfig) -> Result<Self> {
        let registry = Self::new(RegistryOptions {
            flush_timeout: config.flush_timeout(),
            attach_environment: config.attach_environment,
        });
        {
            let mut map = registry.write();
            for (name, destination) in config.destinations() {
                let transport = build_transport(destination)
                    .map_err(|error| error.with_metadata("destination", name.as_str()))?;
                map.insert(name.clone(), transport);
            }
        }
        Ok(registry)
    }

    /// Replace the fatal-path terminator.
    #[must_use]
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Current settings.
    #[must_use]
    pub const fn options(&self) -> RegistryOptions {
        self.options
    }

    fn read(&self) -> RwLockReadGuard<'_, TransportMap> {
        self.destinations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TransportMap> {
        self.destinations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<(DestinationName, Arc<dyn Transport>)> {
        self.read()
            .iter()
            .map(|(name, transport)| (name.clone(), Arc::clone(transport)))
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn Transport>> {
        let name = DestinationName::parse(name).ok()?;
        self.read().get(&name).map(Arc::clone)
    }

    // ── Destinations ────────────────────────────────────────────────────

    /// Validate `config`, build its transport, and register it under `name`.
    ///
    /// Invalid settings are returned as `config:*` errors. A file that cannot
    /// be opened is also escalated as a FATAL event.
    pub fn add_destination(&self, name: &str, config: &DestinationConfig) -> Result<()> {
        let parsed = DestinationName::parse(name)?;
        if self.read().contains_key(&parsed) {
            return Err(duplicate_error(&parsed));
        }
        let config = config
            .clone()
            .validate_and_normalize(&parsed)
            .map_err(|error| ErrorEnvelope::from(error).with_metadata("destination", parsed.as_str()))?;
        let transport = match build_transport(&config) {
            Ok(transport) => transport,
            Err(error) => {
                let error = error.with_metadata("destination", parsed.as_str());
                if matches!(config, DestinationConfig::File(_)) {
                    self.set("destination", parsed.as_str())
                        .fatal(&error, "Could not open log destination file");
                }
                return Err(error);
            },
        };
        self.register(parsed, transport)
    }

    /// Register an already-built transport under `name`.
    pub fn add_transport(&self, name: &str, transport: Arc<dyn Transport>) -> Result<()> {
        let parsed = DestinationName::parse(name)?;
        self.register(parsed, transport)
    }

    fn register(&self, name: DestinationName, transport: Arc<dyn Transport>) -> Result<()> {
        let endpoint = transport.remote_endpoint().map(str::to_owned);
        {
            let mut map = self.write();
            if map.contains_key(&name) {
                return Err(duplicate_error(&name));
            }
            map.insert(name.clone(), transport);
        }
        tracing::debug!(destination = %name, "destination registered");

        let builder = self.set("destination", name.as_str());
        match endpoint {
            Some(endpoint) => builder
                .set("endpoint", endpoint)
                .info("Log destination added, events will be delivered remotely"),
            None => builder
                .warn("Log destination added without a remote endpoint, no events will be delivered remotely"),
        }
        Ok(())
    }

    /// Unregister `name`; absent names produce a WARN event only.
    pub fn remove_destination(&self, name: &str) {
        let Some(parsed) = DestinationName::parse(name)
            .ok()
            .filter(|parsed| self.read().contains_key(parsed))
        else {
            self.set("destination", name)
                .warn("Log destination to remove doesn't exist");
            return;
        };
        self.set("destination", parsed.as_str())
            .info("About to remove log destination, no events will be delivered");
        self.write().remove(&parsed);
    }

    /// Change the threshold of `name` in place; absent names produce a WARN event.
    pub fn set_threshold(&self, name: &str, threshold: Severity) {
        let found = DestinationName::parse(name).ok().and_then(|parsed| {
            let transport = self.read().get(&parsed).map(Arc::clone)?;
            Some((parsed, transport))
        });
        let Some((parsed, transport)) = found else {
            self.set("destination", name)
                .warn("Cannot set log level, log destination doesn't exist");
            return;
        };
        self.set("destination", parsed.as_str())
            .set("level", threshold.as_str())
            .info("Changing log level");
        transport.set_threshold(threshold);
    }

    /// Threshold of `name`, if registered.
    #[must_use]
    pub fn threshold(&self, name: &str) -> Option<Severity> {
        self.lookup(name).map(|transport| transport.threshold())
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().keys().map(ToString::to_string).collect()
    }

    /// Number of destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true when no destination is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Deliver `event` to every destination whose threshold admits it.
    ///
    /// A destination that errors or panics is reported through `tracing` and
    /// does not stop delivery to the others.
    pub fn broadcast(&self, event: &StructuredEvent) {
        for (name, transport) in self.snapshot() {
            if !transport.accepts(event.level()) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| transport.receive(event))) {
                Ok(Ok(())) => {},
                Ok(Err(error)) => {
                    tracing::warn!(destination = %name, %error, "destination rejected event");
                },
                Err(_) => {
                    tracing::error!(destination = %name, "destination panicked while receiving event");
                },
            }
        }
    }

    /// Flush every destination against one shared deadline.
    ///
    /// Returns false when any destination did not drain in time.
    pub fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut drained = true;
        for (name, transport) in self.snapshot() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !transport.flush(remaining) {
                tracing::warn!(destination = %name, ?timeout, "flush timed out");
                drained = false;
            }
        }
        drained
    }

    /// Flush, then unregister every destination.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let drained = self.flush(timeout);
        self.write().clear();
        drained
    }

    // ── Logging ─────────────────────────────────────────────────────────

    /// Start a builder whose current group is `group`.
    pub fn begin(&self, group: &str) -> ContextBuilder<'_> {
        ContextBuilder::new(self, group)
    }

    /// Shortcut for `begin("Default Context").set(key, value)`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<ContextValue>) -> ContextBuilder<'_> {
        self.begin(DEFAULT_CONTEXT).set(key, value)
    }

    /// DEBUG event without context groups.
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Severity::Debug, ContextGroups::new(), None, message.into());
    }

    /// INFO event without context groups.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, ContextGroups::new(), None, message.into());
    }

    /// WARN event without context groups.
    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Severity::Warn, ContextGroups::new(), None, message.into());
    }

    /// ERROR event carrying `error` and the caller's stack.
    pub fn error<E>(&self, error: &E, message: impl Into<String>)
    where
        E: Error + ?Sized,
    {
        let attached = self.attach(error);
        self.emit(Severity::Error, ContextGroups::new(), Some(attached), message.into());
    }

    /// FATAL event, bounded flush, then process termination.
    pub fn fatal<E>(&self, error: &E, message: impl Into<String>)
    where
        E: Error + ?Sized,
    {
        let attached = self.attach(error);
        self.emit_fatal(ContextGroups::new(), attached, message.into());
    }

    pub(crate) fn attach<E>(&self, error: &E) -> AttachedError
    where
        E: Error + ?Sized,
    {
        AttachedError::from_error(error, capture_stack(&self.filter))
    }

    pub(crate) fn emit(
        &self,
        level: Severity,
        contexts: ContextGroups,
        error: Option<AttachedError>,
        message: String,
    ) {
        let contexts = if self.options.attach_environment {
            let mut merged = environment_contexts();
            merged.merge(contexts);
            merged
        } else {
            contexts
        };
        let mut event = StructuredEvent::new(level, message).with_contexts(contexts);
        if let Some(error) = error {
            event = event.with_error(error);
        }
        self.broadcast(&event);
    }

    pub(crate) fn emit_fatal(&self, contexts: ContextGroups, error: AttachedError, message: String) {
        self.emit(Severity::Fatal, contexts, Some(error), message);
        if !self.flush(self.options.flush_timeout) {
            tracing::error!(timeout = ?self.options.flush_timeout, "fatal flush did not complete");
        }
        self.terminator.terminate(FATAL_EXIT_CODE);
    }
}

fn duplicate_error(name: &DestinationName) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        destination_exists(),
        format!("destination already exists: {name}"),
    )
    .with_metadata("destination", name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanlog_adapters::{IoTransport, MemorySink};

    fn memory_destination(threshold: Severity) -> (Arc<dyn Transport>, MemorySink) {
        let sink = MemorySink::new();
        let transport: Arc<dyn Transport> =
            Arc::new(IoTransport::new(Arc::new(sink.clone()), Arc::new(sink.clone()), threshold));
        (transport, sink)
    }

    #[test]
    fn default_registry_has_quiet_console() {
        let registry = Registry::default();
        assert_eq!(registry.names(), vec![DEFAULT_CONSOLE_NAME.to_owned()]);
        assert_eq!(registry.threshold(DEFAULT_CONSOLE_NAME), Some(Severity::Debug));
    }

    #[test]
    fn add_announces_through_new_destination() -> Result<()> {
        let registry = Registry::new(RegistryOptions::default());
        let (transport, sink) = memory_destination(Severity::Debug);
        registry.add_transport("mem", transport)?;

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines.first().is_some_and(|line| line.starts_with("WRN") && line.contains("destination=mem")));
        Ok(())
    }

    #[test]
    fn invalid_names_are_rejected() {
        let registry = Registry::new(RegistryOptions::default());
        let (transport, _sink) = memory_destination(Severity::Debug);
        let error = registry.add_transport("  ", transport).err();
        assert!(error.is_some_and(|error| error.code.namespace() == "domain"));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_announces_before_deleting() -> Result<()> {
        let registry = Registry::new(RegistryOptions::default());
        let (transport, sink) = memory_destination(Severity::Debug);
        registry.add_transport("mem", transport)?;
        sink.take();

        registry.remove_destination("mem");
        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines.first().is_some_and(|line| line.starts_with("INF")));
        assert!(!registry.contains("mem"));
        Ok(())
    }

    #[test]
    fn set_threshold_announces_then_updates() -> Result<()> {
        let registry = Registry::new(RegistryOptions::default());
        let (transport, sink) = memory_destination(Severity::Debug);
        registry.add_transport("mem", transport)?;
        sink.take();

        registry.set_threshold("mem", Severity::Error);
        let lines = sink.take();
        assert!(lines.first().is_some_and(|line| line.contains("level=error")));
        assert_eq!(registry.threshold("mem"), Some(Severity::Error));

        registry.set_threshold("absent", Severity::Debug);
        assert!(sink.take().is_empty());
        Ok(())
    }

    #[test]
    fn environment_groups_are_attached_when_enabled() -> Result<()> {
        let registry = Registry::new(RegistryOptions {
            attach_environment: true,
            ..RegistryOptions::default()
        });
        let (transport, sink) = memory_destination(Severity::Info);
        registry.add_transport("mem", transport)?;
        sink.take();

        registry.set("k", "v").info("hello");
        let lines = sink.take();
        let line = lines.first().map(String::as_str).unwrap_or_default();
        assert!(line.contains(" k=v"));
        assert!(!line.contains("name="));
        Ok(())
    }
}
