//! # fanlog-config
//!
//! Configuration schema, env overrides, and loaders for the fanlog facade.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, ConsoleDestinationConfig, DEFAULT_CONSOLE_NAME,
    DEFAULT_FLUSH_TIMEOUT_MS, DEFAULT_REMOTE_TIMEOUT_MS, DestinationConfig, FacadeConfig,
    FileDestinationConfig, RemoteDestinationConfig, ValidatedFacadeConfig,
    parse_facade_config_json, parse_facade_config_toml,
};

pub use env::{EnvParseError, FacadeEnv, apply_env_overrides};
pub use load::{
    ConfigFormat, load_config_from_path, load_config_from_sources, load_config_std_env, to_pretty_json,
    to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanlog_domain::domain_crate_version;
    use fanlog_shared::shared_crate_version;

    #[test]
    fn config_can_use_domain_and_shared() {
        assert!(!config_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
