//! HTTP remote sink posting JSON events from a background worker.
//!
//! `send` serializes and enqueues; a dedicated thread drives a single-threaded
//! tokio runtime that POSTs each payload. Delivery failures are logged and
//! never reach the caller.

use fanlog_domain::StructuredEvent;
use fanlog_ports::{RemoteSink, RemoteSinkOptions};
use fanlog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("collector answered with status {status}")]
    Status { status: u16 },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemotePayload<'a> {
    #[serde(flatten)]
    event: &'a StructuredEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_name: Option<&'a str>,
}

/// Count of queued deliveries not yet finished.
#[derive(Debug, Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        *self.lock() += 1;
    }

    fn finish(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .drained
            .wait_timeout_while(guard, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *guard == 0
    }
}

struct Configured {
    options: RemoteSinkOptions,
    sender: Option<Sender<Value>>,
}

/// Remote sink delivering events to an HTTP collector.
#[derive(Default)]
pub struct HttpRemoteSink {
    state: Mutex<Option<Configured>>,
    pending: Arc<Pending>,
}

impl HttpRemoteSink {
    /// Unconfigured sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Option<Configured>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_worker(&self, endpoint: &str, timeout: Duration) -> Result<Sender<Value>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("remote", "client_init_failed"),
                    format!("failed to build HTTP client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (sender, receiver) = mpsc::channel();
        let endpoint = endpoint.to_owned();
        let pending = Arc::clone(&self.pending);
        std::thread::Builder::new()
            .name("fanlog-remote".to_owned())
            .spawn(move || {
                run_worker(&runtime, &client, &endpoint, &receiver, &pending);
            })?;
        Ok(sender)
    }
}

fn run_worker(
    runtime: &tokio::runtime::Runtime,
    client: &reqwest::Client,
    endpoint: &str,
    receiver: &Receiver<Value>,
    pending: &Pending,
) {
    while let Ok(body) = receiver.recv() {
        if let Err(error) = runtime.block_on(deliver(client, endpoint, &body)) {
            tracing::warn!(%error, endpoint, "remote delivery failed");
        }
        pending.finish();
    }
}

async fn deliver(
    client: &reqwest::Client,
    endpoint: &str,
    body: &Value,
) -> std::result::Result<(), DeliveryError> {
    let response = client.post(endpoint).json(body).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DeliveryError::Status {
            status: status.as_u16(),
        })
    }
}

impl RemoteSink for HttpRemoteSink {
    fn configure(&self, options: &RemoteSinkOptions) -> Result<()> {
        let mut state = self.state();
        if state.is_some() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("remote", "already_configured"),
                "remote sink is already configured",
            ));
        }
        let sender = match options.endpoint.as_deref() {
            Some(endpoint) => Some(self.spawn_worker(endpoint, options.timeout)?),
            None => None,
        };
        *state = Some(Configured {
            options: options.clone(),
            sender,
        });
        Ok(())
    }

    fn endpoint(&self) -> Option<String> {
        self.state()
            .as_ref()
            .and_then(|configured| configured.options.endpoint.clone())
    }

    fn send(&self, event: &StructuredEvent) -> Result<()> {
        let state = self.state();
        let Some(Configured {
            options,
            sender: Some(sender),
        }) = state.as_ref()
        else {
            return Ok(());
        };

        let payload = RemotePayload {
            event,
            environment: options.environment.as_deref(),
            release: options.release.as_deref(),
            server_name: options.server_name.as_deref(),
        };
        let body = serde_json::to_value(&payload).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("transport", "serialize_failed"),
                format!("failed to serialize event: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;

        self.pending.begin();
        if sender.send(body).is_err() {
            self.pending.finish();
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::new("remote", "worker_stopped"),
                "remote delivery worker has stopped",
                ErrorClass::NonRetriable,
            ));
        }
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> bool {
        self.pending.wait(timeout)
    }
}

impl Drop for HttpRemoteSink {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain its queue and exit.
        if let Some(configured) = self.state().as_mut() {
            configured.sender = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanlog_domain::Severity;

    #[test]
    fn second_configure_is_rejected() {
        let sink = HttpRemoteSink::new();
        assert!(sink.configure(&RemoteSinkOptions::default()).is_ok());
        let error = sink.configure(&RemoteSinkOptions::default()).err();
        assert!(error.is_some_and(|error| error.code.code() == "already_configured"));
    }

    #[test]
    fn without_endpoint_events_are_discarded() -> Result<()> {
        let sink = HttpRemoteSink::new();
        sink.configure(&RemoteSinkOptions::default())?;
        sink.send(&StructuredEvent::new(Severity::Error, "nowhere"))?;
        assert!(sink.endpoint().is_none());
        assert!(sink.flush(Duration::from_millis(10)));
        Ok(())
    }

    #[test]
    fn payload_flattens_event_with_tags() -> std::result::Result<(), serde_json::Error> {
        let event = StructuredEvent::new(Severity::Warn, "hello");
        let payload = RemotePayload {
            event: &event,
            environment: Some("staging"),
            release: None,
            server_name: Some("web-1"),
        };
        let value = serde_json::to_value(&payload)?;
        assert_eq!(value["message"], "hello");
        assert_eq!(value["environment"], "staging");
        assert_eq!(value["serverName"], "web-1");
        assert!(value.get("release").is_none());
        Ok(())
    }
}
