//! Remote sinks that do not touch the network.

use fanlog_domain::StructuredEvent;
use fanlog_ports::{RemoteSink, RemoteSinkOptions};
use fanlog_shared::Result;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Sink that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRemoteSink;

impl RemoteSink for NullRemoteSink {
    fn configure(&self, _options: &RemoteSinkOptions) -> Result<()> {
        Ok(())
    }

    fn endpoint(&self) -> Option<String> {
        None
    }

    fn send(&self, _event: &StructuredEvent) -> Result<()> {
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct MemoryRemoteState {
    options: Option<RemoteSinkOptions>,
    events: Vec<StructuredEvent>,
}

/// Sink recording configured options and every sent event.
#[derive(Debug, Default, Clone)]
pub struct MemoryRemoteSink {
    state: Arc<Mutex<MemoryRemoteState>>,
}

impl MemoryRemoteSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events sent so far.
    #[must_use]
    pub fn events(&self) -> Vec<StructuredEvent> {
        self.lock().events.clone()
    }

    /// Options received by `configure`.
    #[must_use]
    pub fn options(&self) -> Option<RemoteSinkOptions> {
        self.lock().options.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRemoteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteSink for MemoryRemoteSink {
    fn configure(&self, options: &RemoteSinkOptions) -> Result<()> {
        self.lock().options = Some(options.clone());
        Ok(())
    }

    fn endpoint(&self) -> Option<String> {
        self.lock().options.as_ref().and_then(|options| options.endpoint.clone())
    }

    fn send(&self, event: &StructuredEvent) -> Result<()> {
        self.lock().events.push(event.clone());
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}
