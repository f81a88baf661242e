//! Config file loading and rendering.
//!
//! Every loader ends in [`apply_env_overrides`], so the result is always
//! validated and environment variables always win.

use crate::{FacadeConfig, FacadeEnv, ValidatedFacadeConfig, apply_env_overrides};
use fanlog_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::io;
use std::path::Path;

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`, also assumed when the path has no extension.
    Json,
    /// `.toml`.
    Toml,
}

impl ConfigFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let Some(extension) = path.extension() else {
            return Ok(Self::Json);
        };
        let extension = extension.to_string_lossy();
        if extension.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if extension.eq_ignore_ascii_case("toml") {
            Ok(Self::Toml)
        } else {
            Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                format!("config files must be .json or .toml, got .{extension}"),
            )
            .with_metadata("path", path.to_string_lossy().to_string()))
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Deserialize without validation.
    pub fn parse(self, input: &str) -> Result<FacadeConfig, ErrorEnvelope> {
        let parsed = match self {
            Self::Json => serde_json::from_str(input).map_err(|error| error.to_string()),
            Self::Toml => toml::from_str(input).map_err(|error| error.to_string()),
        };
        parsed.map_err(|detail| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", format!("invalid_{}", self.label())),
                format!("config is not valid {}: {detail}", self.label()),
            )
        })
    }

    /// Render `config` with a trailing newline.
    pub fn render(self, config: &FacadeConfig) -> Result<String, ErrorEnvelope> {
        let rendered = match self {
            Self::Json => serde_json::to_string_pretty(config).map_err(|error| error.to_string()),
            Self::Toml => toml::to_string_pretty(config).map_err(|error| error.to_string()),
        };
        rendered
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|detail| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("config", "serialize_failed"),
                    format!("could not render config as {}: {detail}", self.label()),
                    ErrorClass::NonRetriable,
                )
            })
    }
}

/// Defaults, then the JSON document, then `env`.
pub fn load_config_from_sources(
    config_json: Option<&str>,
    env: &FacadeEnv,
) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    let base = config_json
        .map(|input| ConfigFormat::Json.parse(input))
        .transpose()?
        .unwrap_or_default();
    apply_env_overrides(base, env)
}

/// Defaults, then the `.json`/`.toml` file at `config_path`, then `env`.
pub fn load_config_from_path(
    config_path: Option<&Path>,
    env: &FacadeEnv,
) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    let base = match config_path {
        Some(path) => {
            let format = ConfigFormat::from_path(path)?;
            format.parse(&read_file(path)?)?
        },
        None => FacadeConfig::default(),
    };
    apply_env_overrides(base, env)
}

/// [`load_config_from_path`] with overrides read from the process environment.
pub fn load_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedFacadeConfig, ErrorEnvelope> {
    let env = FacadeEnv::from_std_env()?;
    load_config_from_path(config_path, &env)
}

/// Pretty JSON with a trailing newline.
pub fn to_pretty_json(config: &FacadeConfig) -> Result<String, ErrorEnvelope> {
    ConfigFormat::Json.render(config)
}

/// Pretty TOML with a trailing newline.
pub fn to_pretty_toml(config: &FacadeConfig) -> Result<String, ErrorEnvelope> {
    ConfigFormat::Toml.render(config)
}

fn read_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = if error.kind() == io::ErrorKind::NotFound {
            "config_file_not_found"
        } else {
            "config_file_unreadable"
        };
        ErrorEnvelope::expected(
            ErrorCode::new("config", code),
            format!("cannot read config file: {error}"),
        )
        .with_metadata("path", path.to_string_lossy().to_string())
    })
}
