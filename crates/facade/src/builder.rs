//! Per-call accumulator of context groups.

use crate::registry::Registry;
use fanlog_domain::{ContextGroups, ContextValue, Severity};
use std::error::Error;

/// Collects named context groups, then emits one event through a terminal call.
///
/// Terminal calls consume the builder, so each builder produces at most one
/// event.
#[must_use = "a context builder emits nothing until a severity method is called"]
pub struct ContextBuilder<'r> {
    registry: &'r Registry,
    current: String,
    groups: ContextGroups,
}

impl<'r> ContextBuilder<'r> {
    pub(crate) fn new(registry: &'r Registry, group: &str) -> Self {
        let mut groups = ContextGroups::new();
        groups.ensure_group(group);
        Self {
            registry,
            current: group.to_owned(),
            groups,
        }
    }

    /// Switch the current group, creating it when absent.
    pub fn group(mut self, name: &str) -> Self {
        self.groups.ensure_group(name);
        name.clone_into(&mut self.current);
        self
    }

    /// Insert or overwrite `key` in the current group.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.groups.insert(&self.current, key, value);
        self
    }

    /// Name of the current group.
    #[must_use]
    pub fn current_group(&self) -> &str {
        &self.current
    }

    /// Groups collected so far.
    #[must_use]
    pub const fn contexts(&self) -> &ContextGroups {
        &self.groups
    }

    /// Emit at DEBUG.
    pub fn debug(self, message: impl Into<String>) {
        self.registry
            .emit(Severity::Debug, self.groups, None, message.into());
    }

    /// Emit at INFO.
    pub fn info(self, message: impl Into<String>) {
        self.registry
            .emit(Severity::Info, self.groups, None, message.into());
    }

    /// Emit at WARN.
    pub fn warn(self, message: impl Into<String>) {
        self.registry
            .emit(Severity::Warn, self.groups, None, message.into());
    }

    /// Emit at ERROR with `error` and the caller's stack attached.
    pub fn error<E>(self, error: &E, message: impl Into<String>)
    where
        E: Error + ?Sized,
    {
        let attached = self.registry.attach(error);
        self.registry
            .emit(Severity::Error, self.groups, Some(attached), message.into());
    }

    /// Emit at FATAL, flush every destination, then terminate the process.
    pub fn fatal<E>(self, error: &E, message: impl Into<String>)
    where
        E: Error + ?Sized,
    {
        let attached = self.registry.attach(error);
        self.registry
            .emit_fatal(self.groups, attached, message.into());
    }
}
