//! Remote delivery client contract.

use fanlog_domain::StructuredEvent;
use fanlog_shared::Result;
use std::time::Duration;

/// Default per-request timeout for remote delivery.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Options applied once when a remote sink is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSinkOptions {
    /// Delivery URL; `None` discards events.
    pub endpoint: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Deployment environment tag (e.g. `production`).
    pub environment: Option<String>,
    /// Release identifier.
    pub release: Option<String>,
    /// Host name reported with each event.
    pub server_name: Option<String>,
}

impl Default for RemoteSinkOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
            environment: None,
            release: None,
            server_name: None,
        }
    }
}

impl RemoteSinkOptions {
    /// Options pointing at `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }
}

/// Opaque client that accepts structured events for remote delivery.
pub trait RemoteSink: Send + Sync {
    /// Apply options; called once before the first `send`.
    fn configure(&self, options: &RemoteSinkOptions) -> Result<()>;

    /// Configured endpoint, if any.
    fn endpoint(&self) -> Option<String>;

    /// Hand one event to the client.
    fn send(&self, event: &StructuredEvent) -> Result<()>;

    /// Wait for in-flight deliveries; false when `timeout` elapsed first.
    fn flush(&self, timeout: Duration) -> bool;
}
