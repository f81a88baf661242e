//! Human-readable line rendering and structured dumps.
//!
//! A rendered line reads
//! `<LABEL> <TIMESTAMP> <MESSAGE>[ | <ERROR>][ <key>=<value> ...]`, followed by a
//! `Stacktrace:` block when an error is attached. Environment groups (`os`,
//! `device`, `runtime`) never appear in lines.

use chrono::Local;
use fanlog_domain::{Severity, StackFrame, StructuredEvent, is_reserved_group};
use fanlog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::fmt::Write as _;

/// Escape sequences wrapped around each part of a line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    /// Label colors indexed by severity rank - 1.
    pub levels: [String; 5],
    /// Applied after the label.
    pub text: String,
    /// Timestamp color.
    pub time: String,
    /// Context key color.
    pub key: String,
    /// Stack trace color.
    pub stack: String,
    /// Reset sequence.
    pub reset: String,
}

impl Palette {
    /// ANSI colors used by the console transport.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            levels: [
                "\x1b[95m".into(),
                "\x1b[92m".into(),
                "\x1b[93m".into(),
                "\x1b[31m".into(),
                "\x1b[91m".into(),
            ],
            text: "\x1b[37m".into(),
            time: "\x1b[90m".into(),
            key: "\x1b[36m".into(),
            stack: "\x1b[31m".into(),
            reset: "\x1b[0m".into(),
        }
    }

    /// No escape sequences, for files.
    #[must_use]
    pub fn plain() -> Self {
        Self::default()
    }

    fn level(&self, level: Severity) -> &str {
        self.levels
            .get(usize::from(level.rank().saturating_sub(1)))
            .map_or("", String::as_str)
    }
}

/// Timestamp layout of rendered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStyle {
    /// `HH:MM:SS` local time.
    Clock,
    /// `YYYY/MM/DD HH:MM:SS` local time.
    DateTime,
}

impl TimeStyle {
    const fn pattern(self) -> &'static str {
        match self {
            Self::Clock => "%H:%M:%S",
            Self::DateTime => "%Y/%m/%d %H:%M:%S",
        }
    }
}

/// Render `event` as one (possibly multi-line) log line.
#[must_use]
pub fn render_line(event: &StructuredEvent, palette: &Palette, time_style: TimeStyle) -> String {
    let level = event.level();
    let timestamp = event
        .timestamp()
        .with_timezone(&Local)
        .format(time_style.pattern());

    let mut line = String::with_capacity(128);
    let _ = write!(
        line,
        "{}{}{} {}{}{} {}",
        palette.level(level),
        level.label(),
        palette.text,
        palette.time,
        timestamp,
        palette.reset,
        event.message(),
    );

    if let Some(error) = event.error() {
        let _ = write!(line, " | {}", error.value);
    }

    for (group, entries) in event.contexts().iter() {
        if is_reserved_group(group) {
            continue;
        }
        for (key, value) in entries {
            let _ = write!(line, " {}{key}={}{value}", palette.key, palette.reset);
        }
    }

    if let Some(error) = event.error() {
        let _ = write!(line, "\n{}Stacktrace:", palette.stack);
        for frame in &error.stacktrace.frames {
            line.push_str("\n\t");
            write_frame(&mut line, frame);
        }
        line.push_str(&palette.reset);
    }

    line
}

fn write_frame(line: &mut String, frame: &StackFrame) {
    let path = frame.abs_path.as_deref().unwrap_or("<unknown>");
    let lineno = frame.lineno.unwrap_or(0);
    match frame.context_line.as_deref().map(str::trim) {
        Some(source) if !source.is_empty() => {
            let _ = write!(line, "{path}:{lineno} >>  {source}");
        },
        _ => {
            let _ = write!(line, "{path}:{lineno}");
        },
    }
}

/// Render `event` as indented JSON.
pub fn render_raw(event: &StructuredEvent) -> Result<String> {
    serde_json::to_string_pretty(event).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("transport", "serialize_failed"),
            format!("failed to serialize event: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fanlog_domain::{AttachedError, CallStack, ContextGroups};

    fn event(level: Severity, message: &str) -> StructuredEvent {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single().unwrap_or_default();
        StructuredEvent::at(timestamp, level, message)
    }

    fn contexts() -> ContextGroups {
        let mut groups = ContextGroups::new();
        groups.insert("request", "k", "v");
        groups.insert("os", "name", "linux");
        groups
    }

    #[test]
    fn line_without_error_has_message_and_keys_only() {
        let line = render_line(
            &event(Severity::Info, "M").with_contexts(contexts()),
            &Palette::plain(),
            TimeStyle::Clock,
        );
        assert!(line.starts_with("INF "));
        assert!(line.contains(" M"));
        assert!(line.contains(" k=v"));
        assert!(!line.contains("name=linux"));
        assert!(!line.contains("Stacktrace:"));
        assert!(!line.contains(" | "));
    }

    #[test]
    fn line_with_error_adds_text_and_stack_block() {
        let stack = CallStack::new(vec![
            StackFrame::new("app", "app::main").at("src/main.rs", 3),
            StackFrame::new("app", "app::save")
                .at("src/store.rs", 42)
                .with_context_line("    store.save()?;"),
        ]);
        let event = event(Severity::Error, "save failed")
            .with_contexts(contexts())
            .with_error(AttachedError::new("disk full", "std::io::Error", stack));
        let line = render_line(&event, &Palette::plain(), TimeStyle::Clock);

        assert!(line.contains("save failed | disk full k=v"));
        assert!(line.contains("\nStacktrace:\n\tsrc/main.rs:3\n\tsrc/store.rs:42 >>  store.save()?;"));
    }

    #[test]
    fn date_style_includes_calendar_date() {
        let line = render_line(&event(Severity::Warn, "x"), &Palette::plain(), TimeStyle::DateTime);
        let local = event(Severity::Warn, "x")
            .timestamp()
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string();
        assert_eq!(line, format!("WRN {local} x"));
    }

    #[test]
    fn ansi_palette_wraps_label_and_keys() {
        let line = render_line(
            &event(Severity::Debug, "m").with_contexts(contexts()),
            &Palette::ansi(),
            TimeStyle::Clock,
        );
        assert!(line.starts_with("\x1b[95mDBG\x1b[37m \x1b[90m"));
        assert!(line.contains(" \x1b[36mk=\x1b[0mv"));
    }

    #[test]
    fn raw_render_is_indented_json() -> Result<()> {
        let dump = render_raw(&event(Severity::Info, "hello").with_contexts(contexts()))?;
        assert!(dump.contains("\n  \"level\": \"info\""));
        assert!(dump.contains("\"os\""));
        Ok(())
    }
}
