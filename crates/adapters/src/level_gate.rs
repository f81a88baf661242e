//! Interior-mutable threshold shared by every transport shape.

use fanlog_domain::Severity;
use std::sync::atomic::{AtomicU8, Ordering};

/// Minimum severity, readable and writable through `&self`.
#[derive(Debug)]
pub struct LevelGate(AtomicU8);

impl LevelGate {
    /// Gate starting at `threshold`.
    #[must_use]
    pub const fn new(threshold: Severity) -> Self {
        Self(AtomicU8::new(threshold.rank()))
    }

    /// Current threshold.
    #[must_use]
    pub fn get(&self) -> Severity {
        Severity::from_rank(self.0.load(Ordering::Acquire)).unwrap_or(Severity::Debug)
    }

    /// Replace the threshold.
    pub fn set(&self, threshold: Severity) {
        self.0.store(threshold.rank(), Ordering::Release);
    }

    /// Returns true when `level` passes.
    #[must_use]
    pub fn admits(&self, level: Severity) -> bool {
        level.passes(self.get())
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_tracks_updates() {
        let gate = LevelGate::new(Severity::Warn);
        assert!(!gate.admits(Severity::Info));
        assert!(gate.admits(Severity::Warn));
        gate.set(Severity::Error);
        assert_eq!(gate.get(), Severity::Error);
        assert!(!gate.admits(Severity::Warn));
    }
}
