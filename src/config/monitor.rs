use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use config::{
    builder::DefaultState, Config as ConfigBuilder, ConfigError, Environment, File, FileFormat,
};

use crate::ConfigValidationError;

use super::{HttpConfig, LoggingConfig, RpcConfig, StatsConfig};

/// Main application configuration
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// gRPC API configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Stats store configuration
    #[serde(default)]
    pub stats: StatsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default configuration directory
    pub const CONFIG_DIR: &'static str = "config";

    /// Environment variable prefix
    const ENV_PREFIX: &'static str = "FLEET_MONITOR";

    /// Build configuration using the following priority (highest to lowest):
    /// 1. Environment variables (FLEET_MONITOR_<SECTION>__<KEY>)
    /// 2. Local configuration file (config/local.yaml)
    /// 3. Environment specific file (config/{env}.yaml)
    /// 4. Default configuration (config/default.yaml)
    /// 5. Built-in defaults
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::with_defaults(ConfigBuilder::builder())?;

        let config = builder
            .add_source(
                File::new(&format!("{}/default", Self::CONFIG_DIR), FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                File::new(
                    &format!("{}/{}", Self::CONFIG_DIR, environment),
                    FileFormat::Yaml,
                )
                .required(false),
            )
            .add_source(
                File::new(&format!("{}/local", Self::CONFIG_DIR), FileFormat::Yaml).required(false),
            )
            .add_source(Self::environment())
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate().map_err(Self::validation_error)?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(ConfigBuilder::builder())?;

        let config = builder
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate().map_err(Self::validation_error)?;

        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<DefaultState>,
    ) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Config::default();

        builder
            // HTTP configuration
            .set_default("http.enabled", defaults.http.enabled)?
            .set_default("http.bind_addr", defaults.http.bind_addr)?
            .set_default("http.bind_port", defaults.http.bind_port)?
            // gRPC configuration
            .set_default("rpc.enabled", defaults.rpc.enabled)?
            .set_default("rpc.bind_addr", defaults.rpc.bind_addr)?
            .set_default("rpc.bind_port", defaults.rpc.bind_port)?
            // Stats configuration
            .set_default(
                "stats.roster_path",
                defaults.stats.roster_path.to_string_lossy().into_owned(),
            )?
            .set_default("stats.queue_capacity", defaults.stats.queue_capacity as i64)?
            .set_default(
                "stats.shutdown_timeout",
                format!("{}s", defaults.stats.shutdown_timeout.as_secs()),
            )?
            // Logging configuration
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default(
                "logging.include_location",
                defaults.logging.include_location,
            )?
            .set_default("logging.thread_ids", defaults.logging.thread_ids)?
            .set_default("logging.thread_names", defaults.logging.thread_names)
    }

    fn environment() -> Environment {
        Environment::with_prefix(Self::ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn validation_error(err: ConfigValidationError) -> ConfigError {
        ConfigError::Message(err.to_string())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.http.validate()?;
        self.rpc.validate()?;
        self.stats.validate()?;
        self.logging.validate()?;

        if !self.http.enabled && !self.rpc.enabled {
            return Err(ConfigValidationError::config(
                "at least one of http or rpc must be enabled",
            ));
        }

        if self.http.enabled && self.rpc.enabled && self.http.address() == self.rpc.address() {
            return Err(ConfigValidationError::config(format!(
                "http and rpc cannot share the same address {}",
                self.http.address()
            )));
        }

        Ok(())
    }
}
