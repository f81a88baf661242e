//! Destination capability contract.

use fanlog_domain::{Severity, StructuredEvent};
use fanlog_shared::Result;
use std::time::Duration;

/// A configured delivery mechanism bound to one destination name.
///
/// Implementations are shared across threads and invoked concurrently by the
/// registry; the threshold is interior-mutable.
pub trait Transport: Send + Sync {
    /// Current minimum severity.
    fn threshold(&self) -> Severity;

    /// Replace the minimum severity in place.
    fn set_threshold(&self, threshold: Severity);

    /// Remote endpoint the transport delivers to, if any.
    fn remote_endpoint(&self) -> Option<&str> {
        None
    }

    /// Returns true when `level` passes the current threshold.
    fn accepts(&self, level: Severity) -> bool {
        level.passes(self.threshold())
    }

    /// Deliver one event. Events below the threshold are dropped with `Ok`.
    fn receive(&self, event: &StructuredEvent) -> Result<()>;

    /// Drain buffered output; false when `timeout` elapsed first.
    fn flush(&self, timeout: Duration) -> bool;
}
