//! Transport forwarding events to a remote sink.

use crate::level_gate::LevelGate;
use fanlog_domain::{Severity, StructuredEvent};
use fanlog_ports::{RemoteSink, RemoteSinkOptions, Transport};
use fanlog_shared::Result;
use std::sync::Arc;
use std::time::Duration;

/// Hands every admitted event to a [`RemoteSink`].
pub struct RemoteTransport {
    gate: LevelGate,
    sink: Arc<dyn RemoteSink>,
    endpoint: Option<String>,
}

impl RemoteTransport {
    /// Configure `sink` with `options` and wrap it.
    pub fn new(
        sink: Arc<dyn RemoteSink>,
        options: &RemoteSinkOptions,
        threshold: Severity,
    ) -> Result<Self> {
        sink.configure(options)?;
        let endpoint = sink.endpoint();
        Ok(Self {
            gate: LevelGate::new(threshold),
            sink,
            endpoint,
        })
    }
}

impl std::fmt::Debug for RemoteTransport {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RemoteTransport")
            .field("threshold", &self.gate.get())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Transport for RemoteTransport {
    fn threshold(&self) -> Severity {
        self.gate.get()
    }

    fn set_threshold(&self, threshold: Severity) {
        self.gate.set(threshold);
    }

    fn remote_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn receive(&self, event: &StructuredEvent) -> Result<()> {
        if !self.gate.admits(event.level()) {
            return Ok(());
        }
        self.sink.send(event)
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.sink.flush(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote_sinks::{MemoryRemoteSink, NullRemoteSink};

    #[test]
    fn forwards_admitted_events_only() -> Result<()> {
        let sink = MemoryRemoteSink::new();
        let options = RemoteSinkOptions::with_endpoint("https://collector.test/ingest");
        let transport = RemoteTransport::new(Arc::new(sink.clone()), &options, Severity::Warn)?;

        transport.receive(&StructuredEvent::new(Severity::Info, "dropped"))?;
        transport.receive(&StructuredEvent::new(Severity::Error, "kept"))?;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events.first().is_some_and(|event| event.message() == "kept"));
        assert_eq!(transport.remote_endpoint(), Some("https://collector.test/ingest"));
        assert_eq!(sink.options(), Some(options));
        Ok(())
    }

    #[test]
    fn null_sink_reports_no_endpoint() -> Result<()> {
        let transport = RemoteTransport::new(
            Arc::new(NullRemoteSink),
            &RemoteSinkOptions::default(),
            Severity::Debug,
        )?;
        assert!(transport.remote_endpoint().is_none());
        assert!(transport.accepts(Severity::Debug));
        assert!(transport.flush(Duration::from_millis(10)));
        Ok(())
    }
}
