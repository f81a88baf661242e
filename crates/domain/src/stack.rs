//! Call stacks attached to error events, and trimming of facade frames.

use serde::{Deserialize, Serialize};

/// One resolved frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Crate the frame's function belongs to (e.g. `my_app`).
    pub module: String,
    /// Demangled function path without the trailing hash.
    pub function: String,
    /// Source file path, when debug info resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>,
    /// 1-based line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    /// The source line itself, when the file was readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_line: Option<String>,
}

impl StackFrame {
    /// Frame with only a module and function known.
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            abs_path: None,
            lineno: None,
            context_line: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, abs_path: impl Into<String>, lineno: u32) -> Self {
        self.abs_path = Some(abs_path.into());
        self.lineno = Some(lineno);
        self
    }

    /// Attach the source line text.
    #[must_use]
    pub fn with_context_line(mut self, line: impl Into<String>) -> Self {
        self.context_line = Some(line.into());
        self
    }
}

/// Frames ordered outermost first; the last frame is the innermost call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStack {
    /// Ordered frames.
    pub frames: Vec<StackFrame>,
}

impl CallStack {
    /// Wrap frames already ordered outermost first.
    #[must_use]
    pub const fn new(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true when no frame was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The innermost frame.
    #[must_use]
    pub fn innermost(&self) -> Option<&StackFrame> {
        self.frames.last()
    }
}

/// Drops the facade's own frames from the innermost end of a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFilter {
    internal_modules: Vec<Box<str>>,
}

impl StackFilter {
    /// Filter treating frames of any of `modules` as internal.
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        Self {
            internal_modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when the frame belongs to the facade.
    #[must_use]
    pub fn is_internal(&self, frame: &StackFrame) -> bool {
        self.internal_modules
            .iter()
            .any(|module| module.as_ref() == frame.module)
    }

    /// Remove the contiguous run of internal frames at the innermost end.
    ///
    /// The outermost frame is never removed, so a non-empty stack stays
    /// non-empty.
    #[must_use]
    pub fn apply(&self, mut stack: CallStack) -> CallStack {
        while stack.frames.len() > 1 {
            match stack.frames.last() {
                Some(frame) if self.is_internal(frame) => {
                    stack.frames.pop();
                },
                _ => break,
            }
        }
        stack
    }
}
