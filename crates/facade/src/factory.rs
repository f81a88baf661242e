//! Transport selection and construction from destination settings.

use fanlog_adapters::{IoTransport, NullRemoteSink, RemoteTransport};
use fanlog_config::{DestinationConfig, FileDestinationConfig, RemoteDestinationConfig};
use fanlog_ports::{RemoteSink, RemoteSinkOptions, Transport};
use fanlog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::sync::Arc;

/// Error code for transports that could not be built.
#[must_use]
pub fn transport_init_failed() -> ErrorCode {
    ErrorCode::new("transport", "init_failed")
}

/// Build the transport described by `config`.
pub fn build_transport(config: &DestinationConfig) -> Result<Arc<dyn Transport>> {
    match config {
        DestinationConfig::Console(console) => Ok(Arc::new(
            IoTransport::console(console.min_level).with_raw(console.raw),
        )),
        DestinationConfig::File(file) => build_file(file),
        DestinationConfig::Remote(remote) => build_remote(remote),
    }
}

fn build_file(config: &FileDestinationConfig) -> Result<Arc<dyn Transport>> {
    let transport = IoTransport::file(
        &config.out_path,
        Some(config.effective_err_path().as_path()),
        config.min_level,
    )
    .map_err(|error| {
        ErrorEnvelope::unexpected(
            transport_init_failed(),
            format!("failed to open log file: {}", error.message),
            ErrorClass::NonRetriable,
        )
        .with_metadata("kind", "file")
        .with_metadata("cause", error.code.to_string())
        .with_metadata(
            "path",
            error
                .metadata
                .get("path")
                .cloned()
                .unwrap_or_else(|| config.out_path.to_string_lossy().to_string()),
        )
    })?;
    Ok(Arc::new(transport.with_raw(config.raw)))
}

/// Sink options carried by a remote destination.
#[must_use]
pub fn remote_options(config: &RemoteDestinationConfig) -> RemoteSinkOptions {
    RemoteSinkOptions {
        endpoint: config.endpoint.clone(),
        timeout: config.timeout(),
        environment: config.environment.clone(),
        release: config.release.clone(),
        server_name: config.server_name.clone(),
    }
}

fn build_remote(config: &RemoteDestinationConfig) -> Result<Arc<dyn Transport>> {
    let sink = remote_sink_for(config)?;
    let transport = RemoteTransport::new(sink, &remote_options(config), config.min_level)?;
    Ok(Arc::new(transport))
}

#[cfg(feature = "http")]
fn remote_sink_for(config: &RemoteDestinationConfig) -> Result<Arc<dyn RemoteSink>> {
    if config.endpoint.is_none() {
        return Ok(Arc::new(NullRemoteSink));
    }
    Ok(Arc::new(fanlog_adapters::HttpRemoteSink::new()))
}

#[cfg(not(feature = "http"))]
fn remote_sink_for(config: &RemoteDestinationConfig) -> Result<Arc<dyn RemoteSink>> {
    if config.endpoint.is_none() {
        return Ok(Arc::new(NullRemoteSink));
    }
    Err(ErrorEnvelope::expected(
        transport_init_failed(),
        "http remote sink is not enabled in this build",
    )
    .with_metadata("kind", "remote"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanlog_domain::Severity;

    #[test]
    fn console_config_builds_console_transport() -> Result<()> {
        let transport = build_transport(&DestinationConfig::console(Severity::Warn))?;
        assert_eq!(transport.threshold(), Severity::Warn);
        assert!(transport.remote_endpoint().is_none());
        Ok(())
    }

    #[test]
    fn endpointless_remote_discards() -> Result<()> {
        let transport = build_transport(&DestinationConfig::remote(Severity::Info, None))?;
        assert!(transport.remote_endpoint().is_none());
        assert!(transport.flush(std::time::Duration::from_millis(5)));
        Ok(())
    }

    #[test]
    fn unopenable_file_reports_init_failure() {
        let missing = std::env::temp_dir()
            .join(format!("fanlog-missing-{}", std::process::id()))
            .join("nested")
            .join("out.log");
        let error = build_transport(&DestinationConfig::file(Severity::Debug, &missing)).err();
        assert!(error.as_ref().is_some_and(|error| error.has_code(&transport_init_failed())));
        assert!(error.is_some_and(|error| error.metadata.get("kind").map(String::as_str) == Some("file")));
    }

    #[test]
    fn remote_options_copy_tags() {
        let config = RemoteDestinationConfig {
            endpoint: Some("https://collector.test".into()),
            release: Some("2.0.1".into()),
            ..RemoteDestinationConfig::default()
        };
        let options = remote_options(&config);
        assert_eq!(options.endpoint.as_deref(), Some("https://collector.test"));
        assert_eq!(options.release.as_deref(), Some("2.0.1"));
        assert_eq!(options.timeout, config.timeout());
    }
}
