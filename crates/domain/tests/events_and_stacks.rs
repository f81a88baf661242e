//! Integration coverage for events, context groups, and stack trimming.

use fanlog_domain::{
    AttachedError, CallStack, ContextGroups, DestinationName, PrimitiveError, Severity,
    StackFilter, StackFrame, StructuredEvent, is_reserved_group, msg,
};
use fanlog_shared::ErrorEnvelope;

#[test]
fn destination_name_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = DestinationName::parse(" ") else {
        return Err(PrimitiveError::EmptyDestinationName { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_destination_name");
    assert_eq!(envelope.metadata.get("input_length"), Some(&"1".to_string()));
    Ok(())
}

#[test]
fn event_keeps_reserved_groups_as_data() -> Result<(), PrimitiveError> {
    let mut contexts = ContextGroups::new();
    contexts.insert("os", "name", "linux");
    contexts.insert("request", "id", 7_i64);

    let event = StructuredEvent::new(Severity::parse("info")?, msg!("served ", 3, " bytes"))
        .with_contexts(contexts);

    assert_eq!(event.message(), "served 3 bytes");
    assert!(event.contexts().group("os").is_some());
    let visible: Vec<&str> = event
        .contexts()
        .iter()
        .map(|(name, _)| name)
        .filter(|name| !is_reserved_group(name))
        .collect();
    assert_eq!(visible, vec!["request"]);
    Ok(())
}

#[test]
fn trimmed_stack_ends_at_caller_frame() {
    let stack = CallStack::new(vec![
        StackFrame::new("std", "std::rt::lang_start"),
        StackFrame::new("app", "app::main").at("src/main.rs", 10),
        StackFrame::new("app", "app::save").at("src/store.rs", 42),
        StackFrame::new("fanlog", "fanlog::builder::ContextBuilder::error"),
        StackFrame::new("fanlog", "fanlog::stack_capture::capture"),
    ]);
    let filter = StackFilter::new(["fanlog", "fanlog_domain"]);
    let trimmed = filter.apply(stack);

    assert_eq!(trimmed.len(), 3);
    let innermost = trimmed.innermost().map(|frame| frame.function.as_str());
    assert_eq!(innermost, Some("app::save"));

    let event = StructuredEvent::new(Severity::Error, "save failed")
        .with_error(AttachedError::new("disk full", "std::io::Error", trimmed));
    assert_eq!(event.error().map(|error| error.stacktrace.len()), Some(3));
}
