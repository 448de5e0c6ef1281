use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "radix-http.toml";

/// Prefix of the environment variables overriding the file, e.g. `RADIX_HTTP_PORT`.
pub const ENV_PREFIX: &str = "RADIX_HTTP";

/// Settings of the listener and the connection driver.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to bind to. `0` picks a free one.
    pub port: u16,
    /// How long a client may take to send its request.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Loads [`DEFAULT_CONFIG_FILE`] if present, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source cannot be read or holds values of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads the given file if present, then applies environment overrides.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a source cannot be read or holds values of the wrong type.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    /// The request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
