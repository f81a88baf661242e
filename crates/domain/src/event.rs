//! Immutable structured event built once per log call.

use crate::context::ContextGroups;
use crate::severity::Severity;
use crate::stack::CallStack;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Write as _;

/// Logger identifier stamped on every event.
pub const LOGGER_NAME: &str = "fanlog";

/// Application error carried by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedError {
    /// Display text including the `source()` chain.
    pub value: String,
    /// Rust type name of the top-level error.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Call stack at the log site.
    pub stacktrace: CallStack,
}

impl AttachedError {
    /// Build from explicit parts.
    pub fn new(value: impl Into<String>, type_name: impl Into<String>, stacktrace: CallStack) -> Self {
        Self {
            value: value.into(),
            type_name: type_name.into(),
            stacktrace,
        }
    }

    /// Capture text and type of `error`.
    ///
    /// The type name is the static type `E`. A trait object such as
    /// `&*Box<dyn Error>` records `dyn core::error::Error`, not the concrete
    /// error behind it; use [`AttachedError::new`] to name it explicitly.
    pub fn from_error<E>(error: &E, stacktrace: CallStack) -> Self
    where
        E: Error + ?Sized,
    {
        Self::new(error_chain_text(error), std::any::type_name::<E>(), stacktrace)
    }
}

/// `error: source: source...` for the whole chain.
pub fn error_chain_text<E>(error: &E) -> String
where
    E: Error + ?Sized,
{
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

/// One log event as delivered to every destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredEvent {
    timestamp: DateTime<Utc>,
    level: Severity,
    logger: String,
    message: String,
    #[serde(default, skip_serializing_if = "ContextGroups::is_empty")]
    contexts: ContextGroups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<AttachedError>,
}

impl StructuredEvent {
    /// Event stamped with the current time.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }

    /// Event with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, level: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            logger: LOGGER_NAME.to_string(),
            message: message.into(),
            contexts: ContextGroups::new(),
            exception: None,
        }
    }

    /// Replace the context groups.
    #[must_use]
    pub fn with_contexts(mut self, contexts: ContextGroups) -> Self {
        self.contexts = contexts;
        self
    }

    /// Attach an application error.
    #[must_use]
    pub fn with_error(mut self, error: AttachedError) -> Self {
        self.exception = Some(error);
        self
    }

    /// Creation time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Severity.
    #[must_use]
    pub const fn level(&self) -> Severity {
        self.level
    }

    /// Logger identifier.
    #[must_use]
    pub fn logger(&self) -> &str {
        &self.logger
    }

    /// Concatenated message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached context groups.
    #[must_use]
    pub const fn contexts(&self) -> &ContextGroups {
        &self.contexts
    }

    /// Attached error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&AttachedError> {
        self.exception.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackFrame;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("save failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("disk full")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    impl Error for Inner {}

    #[test]
    fn error_text_includes_source_chain() {
        let attached = AttachedError::from_error(&Outer(Inner), CallStack::default());
        assert_eq!(attached.value, "save failed: disk full");
        assert!(attached.type_name.ends_with("Outer"));
    }

    #[test]
    fn boxed_errors_record_the_trait_object_type() {
        let boxed: Box<dyn Error> = Box::new(Outer(Inner));
        let attached = AttachedError::from_error(&*boxed, CallStack::default());
        assert_eq!(attached.value, "save failed: disk full");
        assert!(attached.type_name.contains("dyn"));
        assert!(attached.type_name.ends_with("Error"));
    }

    #[test]
    fn serialized_event_uses_lowercase_level_and_skips_empty_parts() -> Result<(), serde_json::Error> {
        let event = StructuredEvent::new(Severity::Warn, "hello");
        let value = serde_json::to_value(&event)?;
        assert_eq!(value["level"], "warn");
        assert_eq!(value["logger"], LOGGER_NAME);
        assert!(value.get("contexts").is_none());
        assert!(value.get("exception").is_none());
        Ok(())
    }

    #[test]
    fn attached_error_serializes_type_and_frames() -> Result<(), serde_json::Error> {
        let stack = CallStack::new(vec![StackFrame::new("app", "app::main").at("src/main.rs", 7)]);
        let event = StructuredEvent::new(Severity::Error, "boom")
            .with_error(AttachedError::new("bad", "app::Error", stack));
        let value = serde_json::to_value(&event)?;
        assert_eq!(value["exception"]["type"], "app::Error");
        assert_eq!(value["exception"]["stacktrace"]["frames"][0]["lineno"], 7);
        let decoded: StructuredEvent = serde_json::from_value(value)?;
        assert_eq!(decoded, event);
        Ok(())
    }
}
