//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a present but empty or malformed value fails fast
//! instead of silently falling back to the file or default value.

use crate::schema::{
    DestinationConfig, FacadeConfig, RemoteDestinationConfig, ValidatedFacadeConfig,
};
use fanlog_domain::Severity;
use fanlog_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: threshold of every console destination.
pub const ENV_CONSOLE_LEVEL: &str = "FANLOG_CONSOLE_LEVEL";
/// Env var: raw JSON output on every console destination.
pub const ENV_CONSOLE_RAW: &str = "FANLOG_CONSOLE_RAW";
/// Env var: fatal-path flush timeout in milliseconds.
pub const ENV_FLUSH_TIMEOUT_MS: &str = "FANLOG_FLUSH_TIMEOUT_MS";
/// Env var: remote delivery endpoint.
pub const ENV_REMOTE_ENDPOINT: &str = "FANLOG_REMOTE_ENDPOINT";
/// Env var: remote environment tag.
pub const ENV_REMOTE_ENVIRONMENT: &str = "FANLOG_REMOTE_ENVIRONMENT";
/// Env var: remote release identifier.
pub const ENV_REMOTE_RELEASE: &str = "FANLOG_REMOTE_RELEASE";
/// Env var: attach environment context groups.
pub const ENV_ATTACH_ENVIRONMENT: &str = "FANLOG_ATTACH_ENVIRONMENT";

/// Destination created when only the env names a remote endpoint.
pub const ENV_REMOTE_DESTINATION_NAME: &str = "remote";

const ALL_ENV_VARS: [&str; 7] = [
    ENV_CONSOLE_LEVEL,
    ENV_CONSOLE_RAW,
    ENV_FLUSH_TIMEOUT_MS,
    ENV_REMOTE_ENDPOINT,
    ENV_REMOTE_ENVIRONMENT,
    ENV_REMOTE_RELEASE,
    ENV_ATTACH_ENVIRONMENT,
];

/// Parsed env overrides; `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadeEnv {
    /// Console threshold.
    pub console_level: Option<Severity>,
    /// Console raw mode.
    pub console_raw: Option<bool>,
    /// Flush timeout (ms).
    pub flush_timeout_ms: Option<u64>,
    /// Remote endpoint (normalized URL).
    pub remote_endpoint: Option<Box<str>>,
    /// Remote environment tag.
    pub remote_environment: Option<Box<str>>,
    /// Remote release identifier.
    pub remote_release: Option<Box<str>>,
    /// Environment context groups.
    pub attach_environment: Option<bool>,
}

impl FacadeEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            console_level: parse_optional_severity(map, ENV_CONSOLE_LEVEL)?,
            console_raw: parse_optional_bool(map, ENV_CONSOLE_RAW)?,
            flush_timeout_ms: parse_optional_u64(map, ENV_FLUSH_TIMEOUT_MS)?,
            remote_endpoint: parse_optional_url_string(map, ENV_REMOTE_ENDPOINT)?,
            remote_environment: parse_optional_trimmed_string(map, ENV_REMOTE_ENVIRONMENT)?,
            remote_release: parse_optional_trimmed_string(map, ENV_REMOTE_RELEASE)?,
            attach_environment: parse_optional_bool(map, ENV_ATTACH_ENVIRONMENT)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ALL_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| ((*name).to_string(), value)))
            .collect();
        Self::from_map(&map)
    }

    /// Returns true when no variable was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
///
/// Console overrides apply to every console destination. Remote overrides
/// apply to every remote destination; when none exists and an endpoint is
/// set, a `remote` destination is added.
pub fn apply_env_overrides(
    base: FacadeConfig,
    env: &FacadeEnv,
) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(value) = env.flush_timeout_ms {
        config.flush_timeout_ms = value;
    }
    if let Some(value) = env.attach_environment {
        config.attach_environment = value;
    }
    apply_console_env_overrides(&mut config, env);
    apply_remote_env_overrides(&mut config, env);

    config.validate_and_normalize().map_err(Into::into)
}

fn apply_console_env_overrides(config: &mut FacadeConfig, env: &FacadeEnv) {
    for destination in config.destinations.values_mut() {
        if let DestinationConfig::Console(console) = destination {
            if let Some(level) = env.console_level {
                console.min_level = level;
            }
            if let Some(raw) = env.console_raw {
                console.raw = raw;
            }
        }
    }
}

fn apply_remote_env_overrides(config: &mut FacadeConfig, env: &FacadeEnv) {
    let has_remote = config
        .destinations
        .values()
        .any(|destination| matches!(destination, DestinationConfig::Remote(_)));
    if !has_remote && env.remote_endpoint.is_some() {
        config.destinations.insert(
            ENV_REMOTE_DESTINATION_NAME.to_string(),
            DestinationConfig::Remote(RemoteDestinationConfig::default()),
        );
    }

    for destination in config.destinations.values_mut() {
        if let DestinationConfig::Remote(remote) = destination {
            set_opt_string(&mut remote.endpoint, env.remote_endpoint.as_deref());
            set_opt_string(&mut remote.environment, env.remote_environment.as_deref());
            set_opt_string(&mut remote.release, env.remote_release.as_deref());
        }
    }
}

fn set_opt_string(target: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *target = Some(value.to_string());
    }
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Severity env var had an invalid value.
    InvalidSeverity {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidSeverity { .. } => ErrorCode::new("config", "invalid_env_severity"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid http(s) URL"),
            Self::InvalidSeverity { var, .. } => {
                write!(formatter, "{var} must be one of debug, info, warn, error, fatal")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value }
            | EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidSeverity { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

fn non_empty<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<(&'a String, &'a str)>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some((raw, trimmed)))
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    Ok(non_empty(map, var)?.map(|(_, trimmed)| trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some((raw, trimmed)) = non_empty(map, var)? else {
        return Ok(None);
    };
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some((raw, trimmed)) = non_empty(map, var)? else {
        return Ok(None);
    };
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}

fn parse_optional_severity(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Severity>, EnvParseError> {
    let Some((raw, trimmed)) = non_empty(map, var)? else {
        return Ok(None);
    };
    Severity::parse(trimmed)
        .map(Some)
        .map_err(|_| EnvParseError::InvalidSeverity {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some((raw, trimmed)) = non_empty(map, var)? else {
        return Ok(None);
    };
    let invalid = || EnvParseError::InvalidUrl {
        var,
        value: raw.clone(),
    };
    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }
    Ok(Some(parsed.to_string().into_boxed_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DEFAULT_CONSOLE_NAME;

    fn env_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_map_parses_to_no_overrides() -> Result<(), EnvParseError> {
        let env = FacadeEnv::from_map(&BTreeMap::new())?;
        assert!(env.is_empty());
        Ok(())
    }

    #[test]
    fn values_are_trimmed_and_typed() -> Result<(), EnvParseError> {
        let env = FacadeEnv::from_map(&env_map(&[
            (ENV_CONSOLE_LEVEL, " Warning "),
            (ENV_CONSOLE_RAW, "on"),
            (ENV_FLUSH_TIMEOUT_MS, "500"),
            (ENV_REMOTE_RELEASE, " v1 "),
        ]))?;
        assert_eq!(env.console_level, Some(Severity::Warn));
        assert_eq!(env.console_raw, Some(true));
        assert_eq!(env.flush_timeout_ms, Some(500));
        assert_eq!(env.remote_release.as_deref(), Some("v1"));
        Ok(())
    }

    #[test]
    fn invalid_values_fail_fast() {
        assert_eq!(
            FacadeEnv::from_map(&env_map(&[(ENV_CONSOLE_LEVEL, "loud")])),
            Err(EnvParseError::InvalidSeverity {
                var: ENV_CONSOLE_LEVEL,
                value: "loud".into()
            })
        );
        assert_eq!(
            FacadeEnv::from_map(&env_map(&[(ENV_REMOTE_ENDPOINT, "  ")])),
            Err(EnvParseError::EmptyValue {
                var: ENV_REMOTE_ENDPOINT
            })
        );
        assert!(matches!(
            FacadeEnv::from_map(&env_map(&[(ENV_REMOTE_ENDPOINT, "file:///tmp/x")])),
            Err(EnvParseError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn remote_endpoint_adds_remote_destination() -> Result<(), Box<dyn std::error::Error>> {
        let env = FacadeEnv::from_map(&env_map(&[(
            ENV_REMOTE_ENDPOINT,
            "https://logs.example.com/ingest",
        )]))?;
        let config = apply_env_overrides(FacadeConfig::default(), &env)?;
        let remote = config.as_ref().destinations.get(ENV_REMOTE_DESTINATION_NAME);
        assert!(matches!(
            remote,
            Some(DestinationConfig::Remote(RemoteDestinationConfig { endpoint: Some(url), .. }))
                if url == "https://logs.example.com/ingest"
        ));
        assert!(config.as_ref().destinations.contains_key(DEFAULT_CONSOLE_NAME));
        Ok(())
    }
}
