//! Process termination after a fatal event.

/// Exit status used after a fatal event.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Ends the process once a fatal event has been broadcast and flushed.
pub trait Terminator: Send + Sync {
    /// Terminate with `code`. Implementations for tests may return.
    fn terminate(&self, code: i32);
}

/// Calls [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}
