//! Console-to-file handover and config-driven registries.

use fanlog::{
    DestinationConfig, ErrorEnvelope, IoTransport, MemorySink, Registry, RegistryOptions, Result,
    Severity,
};
use fanlog_config::{FacadeEnv, load_config_from_sources};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("fanlog-e2e-{label}-{}-{nanos}.log", std::process::id()))
}

#[test]
fn default_registry_hands_over_from_console_to_file() -> Result<()> {
    let registry = Registry::default();
    assert_eq!(registry.names(), vec!["console".to_owned()]);

    let path = temp_path("handover");
    registry.add_destination("file", &DestinationConfig::file(Severity::Debug, &path))?;
    registry.remove_destination("console");
    registry.info("only in the file");

    assert_eq!(registry.names(), vec!["file".to_owned()]);
    let contents = std::fs::read_to_string(&path)?;
    let matching: Vec<&str> = contents
        .lines()
        .filter(|line| line.contains("only in the file"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert!(matching.first().is_some_and(|line| line.starts_with("INF ")));
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn removed_console_no_longer_receives_events() -> Result<()> {
    let registry = Registry::new(RegistryOptions::default());
    let console = MemorySink::new();
    registry.add_transport(
        "console",
        Arc::new(IoTransport::new(
            Arc::new(console.clone()),
            Arc::new(console.clone()),
            Severity::Debug,
        )),
    )?;

    let path = temp_path("exclusive");
    registry.add_destination("file", &DestinationConfig::file(Severity::Debug, &path))?;
    registry.remove_destination("console");
    registry.info("after removal");

    assert!(console.lines().iter().all(|line| !line.contains("after removal")));
    // Both announcements reached the console before it was removed.
    assert!(console.lines().iter().any(|line| line.contains("destination=file")));
    assert!(console.lines().iter().any(|line| line.contains("About to remove")));

    let contents = std::fs::read_to_string(&path)?;
    assert!(contents.lines().any(|line| line.contains("after removal")));
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn separate_error_file_receives_error_lines() -> Result<()> {
    let registry = Registry::new(RegistryOptions::default());
    let out = temp_path("out");
    let err = temp_path("err");
    let config = DestinationConfig::File(fanlog_config::FileDestinationConfig {
        min_level: Severity::Info,
        raw: false,
        out_path: out.clone(),
        err_path: Some(err.clone()),
    });
    registry.add_destination("file", &config)?;
    registry.debug("dropped");
    registry.error(&std::io::Error::other("db down"), "query failed");
    assert!(registry.flush(Duration::from_millis(100)));

    let out_text = std::fs::read_to_string(&out)?;
    let err_text = std::fs::read_to_string(&err)?;
    assert!(!out_text.contains("dropped"));
    assert!(!out_text.contains("query failed"));
    assert!(err_text.contains("ERR "));
    assert!(err_text.contains("query failed | db down"));
    assert!(err_text.contains("Stacktrace:"));
    std::fs::remove_file(&out)?;
    std::fs::remove_file(&err)?;
    Ok(())
}

#[test]
fn registry_from_config_uses_configured_destinations() -> Result<()> {
    let path = temp_path("configured");
    let json = serde_json::json!({
        "version": 1,
        "flushTimeoutMs": 250,
        "destinations": {
            "audit": { "kind": "file", "minLevel": "warn", "outPath": path, "raw": true },
            "sink": { "kind": "remote", "minLevel": "error" }
        }
    })
    .to_string();
    let config = load_config_from_sources(Some(&json), &FacadeEnv::default())?;
    let registry = Registry::from_config(&config)?;

    assert_eq!(registry.names(), vec!["audit".to_owned(), "sink".to_owned()]);
    assert_eq!(registry.options().flush_timeout, Duration::from_millis(250));
    assert_eq!(registry.threshold("sink"), Some(Severity::Error));

    registry.set("order", 42).warn("stock low");
    let contents = std::fs::read_to_string(&path)?;
    let dump: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|error| ErrorEnvelope::from(std::io::Error::other(error)))?;
    assert_eq!(dump["message"], "stock low");
    assert_eq!(dump["contexts"]["Default Context"]["order"], 42);
    std::fs::remove_file(&path)?;
    Ok(())
}
