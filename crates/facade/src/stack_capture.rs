//! Call-stack capture for attached errors.

use fanlog_domain::{CallStack, StackFilter, StackFrame};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Crates whose frames are trimmed from the innermost end of captured stacks.
pub const INTERNAL_MODULES: [&str; 7] = [
    "fanlog",
    "fanlog_adapters",
    "fanlog_config",
    "fanlog_domain",
    "fanlog_ports",
    "fanlog_shared",
    "backtrace",
];

/// Filter recognizing the facade's own frames.
#[must_use]
pub fn internal_filter() -> StackFilter {
    StackFilter::new(INTERNAL_MODULES)
}

/// Capture the current stack, outermost frame first, with facade frames trimmed.
#[must_use]
pub fn capture_stack(filter: &StackFilter) -> CallStack {
    let backtrace = backtrace::Backtrace::new();
    let mut sources = SourceCache::default();
    let mut frames: Vec<StackFrame> = backtrace
        .frames()
        .iter()
        .flat_map(backtrace::BacktraceFrame::symbols)
        .map(|symbol| resolve_symbol(symbol, &mut sources))
        .collect();
    // Unwinder frames sit below the capture point.
    if let Some(start) = frames.iter().position(|frame| filter.is_internal(frame)) {
        frames.drain(..start);
    }
    frames.reverse();
    filter.apply(CallStack::new(frames))
}

fn resolve_symbol(symbol: &backtrace::BacktraceSymbol, sources: &mut SourceCache) -> StackFrame {
    let function = symbol
        .name()
        .map_or_else(|| "<unknown>".to_owned(), |name| format!("{name:#}"));
    let mut frame = StackFrame::new(module_of(&function), function);
    if let (Some(path), Some(lineno)) = (symbol.filename(), symbol.lineno()) {
        frame = frame.at(path.to_string_lossy(), lineno);
        if let Some(line) = sources.line(path, lineno) {
            frame = frame.with_context_line(line);
        }
    }
    frame
}

/// Crate segment of a demangled symbol path.
///
/// `<fanlog::registry::Registry>::error` and `fanlog::global::info` both
/// resolve to `fanlog`.
#[must_use]
pub fn module_of(function: &str) -> String {
    let trimmed = function.trim_start_matches(['<', '&', '*']).trim_start_matches("mut ");
    trimmed
        .split("::")
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("<unknown>")
        .to_owned()
}

#[derive(Default)]
struct SourceCache {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl SourceCache {
    fn line(&mut self, path: &Path, lineno: u32) -> Option<String> {
        let lines = self.files.entry(path.to_path_buf()).or_insert_with(|| {
            std::fs::read_to_string(path)
                .ok()
                .map(|text| text.lines().map(str::to_owned).collect())
        });
        let index = usize::try_from(lineno.checked_sub(1)?).ok()?;
        lines.as_ref()?.get(index).cloned()
    }
}
