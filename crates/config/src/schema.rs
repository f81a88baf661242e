//! Facade configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Optional strings are trimmed during normalization.

use crate::load::ConfigFormat;
use fanlog_domain::{DestinationName, Severity};
use fanlog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Strips credentials from a URL before it lands in an error message.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Name of the destination present in the default config.
pub const DEFAULT_CONSOLE_NAME: &str = "console";

/// Bounded flush timeout applied by the fatal path (ms).
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 2_000;
const FLUSH_TIMEOUT_MIN_MS: u64 = 1;
const FLUSH_TIMEOUT_MAX_MS: u64 = 60_000;

/// Per-request timeout of remote delivery (ms).
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5_000;
const REMOTE_TIMEOUT_MIN_MS: u64 = 1;
const REMOTE_TIMEOUT_MAX_MS: u64 = 120_000;

/// Top-level facade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FacadeConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Bound on the fatal-path flush (ms).
    pub flush_timeout_ms: u64,
    /// Attach `os`, `device`, and `runtime` groups to every event.
    pub attach_environment: bool,
    /// Destinations keyed by name.
    pub destinations: BTreeMap<String, DestinationConfig>,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        let mut destinations = BTreeMap::new();
        destinations.insert(
            DEFAULT_CONSOLE_NAME.to_string(),
            DestinationConfig::Console(ConsoleDestinationConfig::default()),
        );
        Self {
            version: CURRENT_CONFIG_VERSION,
            flush_timeout_ms: DEFAULT_FLUSH_TIMEOUT_MS,
            attach_environment: false,
            destinations,
        }
    }
}

impl FacadeConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedFacadeConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        check_timeout(
            "facade",
            "flushTimeoutMs",
            self.flush_timeout_ms,
            FLUSH_TIMEOUT_MIN_MS,
            FLUSH_TIMEOUT_MAX_MS,
        )?;

        let mut destinations = Vec::with_capacity(self.destinations.len());
        for (raw_name, destination) in &mut self.destinations {
            let name = DestinationName::parse(raw_name).map_err(|_| {
                ConfigSchemaError::InvalidDestinationName {
                    name: raw_name.clone(),
                }
            })?;
            let checked = destination.clone().validate_and_normalize(&name)?;
            *destination = checked.clone();
            destinations.push((name, checked));
        }

        // Trimmed names must stay unique.
        let mut names: Vec<&DestinationName> = destinations.iter().map(|(name, _)| name).collect();
        names.sort();
        if let Some(pair) = names.windows(2).find(|pair| pair.first() == pair.get(1)) {
            let duplicate = pair.first().map(ToString::to_string).unwrap_or_default();
            return Err(ConfigSchemaError::DuplicateDestination { name: duplicate });
        }

        Ok(ValidatedFacadeConfig {
            raw: self,
            destinations,
        })
    }
}

const fn check_timeout(
    section: &'static str,
    field: &'static str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigSchemaError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigSchemaError::TimeoutOutOfRange {
            section,
            field,
            value_ms,
            min_ms,
            max_ms,
        });
    }
    Ok(())
}

/// Validated config with parsed destination names.
#[derive(Debug, Clone)]
pub struct ValidatedFacadeConfig {
    raw: FacadeConfig,
    destinations: Vec<(DestinationName, DestinationConfig)>,
}

impl ValidatedFacadeConfig {
    /// Fatal-path flush bound.
    #[must_use]
    pub const fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.raw.flush_timeout_ms)
    }

    /// Destinations in name order.
    #[must_use]
    pub fn destinations(&self) -> &[(DestinationName, DestinationConfig)] {
        &self.destinations
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> FacadeConfig {
        self.raw
    }
}

impl AsRef<FacadeConfig> for ValidatedFacadeConfig {
    fn as_ref(&self) -> &FacadeConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedFacadeConfig {
    type Target = FacadeConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// One destination, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DestinationConfig {
    /// Process stdout/stderr.
    Console(ConsoleDestinationConfig),
    /// Append-mode files.
    File(FileDestinationConfig),
    /// Remote delivery client.
    Remote(RemoteDestinationConfig),
}

impl DestinationConfig {
    /// Console destination at `min_level`.
    #[must_use]
    pub const fn console(min_level: Severity) -> Self {
        Self::Console(ConsoleDestinationConfig {
            min_level,
            raw: false,
        })
    }

    /// File destination writing both streams to `out_path`.
    pub fn file(min_level: Severity, out_path: impl Into<PathBuf>) -> Self {
        Self::File(FileDestinationConfig {
            min_level,
            raw: false,
            out_path: out_path.into(),
            err_path: None,
        })
    }

    /// Remote destination; `None` discards events.
    pub fn remote(min_level: Severity, endpoint: Option<String>) -> Self {
        Self::Remote(RemoteDestinationConfig {
            min_level,
            endpoint,
            ..RemoteDestinationConfig::default()
        })
    }

    /// Initial threshold.
    #[must_use]
    pub const fn min_level(&self) -> Severity {
        match self {
            Self::Console(config) => config.min_level,
            Self::File(config) => config.min_level,
            Self::Remote(config) => config.min_level,
        }
    }

    /// Tag used in config files.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Console(_) => "console",
            Self::File(_) => "file",
            Self::Remote(_) => "remote",
        }
    }

    /// Trim optional strings, then check paths, URLs, and timeouts for `name`.
    pub fn validate_and_normalize(
        mut self,
        name: &DestinationName,
    ) -> Result<Self, ConfigSchemaError> {
        self.normalize();
        self.validate(name)?;
        Ok(self)
    }

    fn normalize(&mut self) {
        if let Self::Remote(config) = self {
            config.normalize();
        }
    }

    fn validate(&self, name: &DestinationName) -> Result<(), ConfigSchemaError> {
        match self {
            Self::Console(_) => Ok(()),
            Self::File(config) => config.validate(name),
            Self::Remote(config) => config.validate(name),
        }
    }
}

/// Console destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConsoleDestinationConfig {
    /// Initial threshold.
    pub min_level: Severity,
    /// Dump events as indented JSON instead of lines.
    pub raw: bool,
}

impl Default for ConsoleDestinationConfig {
    fn default() -> Self {
        Self {
            min_level: Severity::Debug,
            raw: false,
        }
    }
}

/// File destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileDestinationConfig {
    /// Initial threshold.
    #[serde(default = "default_min_level")]
    pub min_level: Severity,
    /// Dump events as indented JSON instead of lines.
    #[serde(default)]
    pub raw: bool,
    /// File receiving debug/info/warn lines.
    pub out_path: PathBuf,
    /// File receiving error/fatal lines; defaults to `out_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_path: Option<PathBuf>,
}

impl FileDestinationConfig {
    /// Error-stream path after defaulting.
    #[must_use]
    pub fn effective_err_path(&self) -> &PathBuf {
        self.err_path.as_ref().unwrap_or(&self.out_path)
    }

    fn validate(&self, name: &DestinationName) -> Result<(), ConfigSchemaError> {
        if self.out_path.as_os_str().is_empty() {
            return Err(ConfigSchemaError::EmptyPath {
                destination: name.to_string(),
                field: "outPath",
            });
        }
        if self
            .err_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigSchemaError::EmptyPath {
                destination: name.to_string(),
                field: "errPath",
            });
        }
        Ok(())
    }
}

const fn default_min_level() -> Severity {
    Severity::Debug
}

/// Remote destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RemoteDestinationConfig {
    /// Initial threshold.
    pub min_level: Severity,
    /// Delivery URL (`http` or `https`); absent discards events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Per-request timeout (ms).
    pub timeout_ms: u64,
    /// Deployment environment tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Release identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Reported host name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl Default for RemoteDestinationConfig {
    fn default() -> Self {
        Self {
            min_level: Severity::Debug,
            endpoint: None,
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
            environment: None,
            release: None,
            server_name: None,
        }
    }
}

impl RemoteDestinationConfig {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.endpoint,
            &mut self.environment,
            &mut self.release,
            &mut self.server_name,
        ] {
            *field = field
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
    }

    fn validate(&self, name: &DestinationName) -> Result<(), ConfigSchemaError> {
        check_timeout(
            "remote",
            "timeoutMs",
            self.timeout_ms,
            REMOTE_TIMEOUT_MIN_MS,
            REMOTE_TIMEOUT_MAX_MS,
        )?;
        if let Some(endpoint) = self.endpoint.as_deref() {
            let valid = Url::parse(endpoint)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
            if !valid {
                return Err(ConfigSchemaError::InvalidUrl {
                    destination: name.to_string(),
                    field: "endpoint",
                    url: endpoint.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parse and validate a JSON config document.
pub fn parse_facade_config_json(input: &str) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    Ok(ConfigFormat::Json.parse(input)?.validate_and_normalize()?)
}

/// Parse and validate a TOML config document.
pub fn parse_facade_config_toml(input: &str) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    Ok(ConfigFormat::Toml.parse(input)?.validate_and_normalize()?)
}

/// Schema validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this build.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A timeout value is out of bounds.
    TimeoutOutOfRange {
        /// Schema section (e.g. `remote`).
        section: &'static str,
        /// Field name in the config file (e.g. `timeoutMs`).
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A destination key is not a valid destination name.
    InvalidDestinationName {
        /// Raw key.
        name: String,
    },
    /// Two keys trim to the same destination name.
    DuplicateDestination {
        /// Trimmed name.
        name: String,
    },
    /// A file path is empty.
    EmptyPath {
        /// Destination name.
        destination: String,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A URL entry is invalid.
    InvalidUrl {
        /// Destination name.
        destination: String,
        /// Field name in the config file.
        field: &'static str,
        /// Invalid URL value.
        url: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::InvalidDestinationName { .. } => {
                ErrorCode::new("config", "invalid_destination_name")
            },
            Self::DuplicateDestination { .. } => ErrorCode::new("config", "duplicate_destination"),
            Self::EmptyPath { .. } => ErrorCode::new("config", "empty_path"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})"
            ),
            Self::InvalidDestinationName { name } => {
                write!(formatter, "invalid destination name: {name:?}")
            },
            Self::DuplicateDestination { name } => {
                write!(formatter, "destination {name:?} is declared more than once")
            },
            Self::EmptyPath { destination, field } => {
                write!(formatter, "destinations.{destination}.{field} must be non-empty")
            },
            Self::InvalidUrl {
                destination, field, ..
            } => write!(formatter, "invalid URL for destinations.{destination}.{field}"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string())
                .with_metadata("min_ms", min_ms.to_string())
                .with_metadata("max_ms", max_ms.to_string()),
            ConfigSchemaError::InvalidDestinationName { name }
            | ConfigSchemaError::DuplicateDestination { name } => {
                envelope.with_metadata("destination", name)
            },
            ConfigSchemaError::EmptyPath { destination, field } => envelope
                .with_metadata("destination", destination)
                .with_metadata("field", field),
            ConfigSchemaError::InvalidUrl {
                destination,
                field,
                url,
            } => envelope
                .with_metadata("destination", destination)
                .with_metadata("field", field)
                .with_metadata("url", sanitize_url_for_error(&url)),
        }
    }
}
