//! Configuration for the transport collaborator.
//!
//! Layered loading with the following priority (highest to lowest):
//! 1. Environment variables (`IMGSLOT__<section>__<key>`)
//! 2. TOML configuration file
//! 3. Default values embedded in the structs
//!
//! The file path defaults to `config/imgslot.toml` and can be overridden
//! with the `IMGSLOT_CONFIG` environment variable. A `.env` file is picked
//! up when present.

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_ENV_VAR: &str = "IMGSLOT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/imgslot.toml";
const ENV_PREFIX: &str = "IMGSLOT";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional proxy URL applied to all requests.
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("imgslot/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from all sources (file + environment)
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_path = env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific path and the environment.
    /// Useful for testing with custom config files.
    pub fn load_from(config_path: PathBuf) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if config_path.exists() {
            builder = builder.add_source(File::from(config_path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_defaults_are_sensible() {
        let config = HttpConfig::default();

        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(config.user_agent.starts_with("imgslot/"));
        assert!(config.proxy.is_none());
    }

    #[test]
    fn parses_partial_toml_with_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            r#"
            [http]
            request_timeout_secs = 5
            user_agent = "test-agent"
            "#,
        )
        .expect("failed to parse test config");

        assert_eq!(config.http.request_timeout_secs, 5);
        assert_eq!(config.http.user_agent, "test-agent");
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_from(PathBuf::from("/nonexistent/imgslot.toml"))
            .expect("defaults should load without a file");

        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn environment_variables_override_file_and_defaults() {
        // SAFETY: single-threaded access to these test-only variables; no
        // other test in this module touches the IMGSLOT__ namespace.
        unsafe {
            env::set_var("IMGSLOT__HTTP__REQUEST_TIMEOUT_SECS", "7");
            env::set_var("IMGSLOT__HTTP__PROXY", "http://proxy.test:8080");
        }

        let result = Config::load_from(PathBuf::from("/nonexistent/imgslot.toml"));

        unsafe {
            env::remove_var("IMGSLOT__HTTP__REQUEST_TIMEOUT_SECS");
            env::remove_var("IMGSLOT__HTTP__PROXY");
        }

        let config = result.expect("environment overrides should load");
        assert_eq!(config.http.request_timeout_secs, 7);
        assert_eq!(config.http.proxy.as_deref(), Some("http://proxy.test:8080"));
        // Untouched keys keep their defaults.
        assert_eq!(config.http.connect_timeout_secs, 10);
    }
}
