use thiserror::Error;

use super::{ConfigValidationError, InitializationError, RosterError, StatsError};

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Initialization error: {0}")]
    Init(#[from] InitializationError),

    #[error("Transport error: {details}")]
    Transport {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MonitorError {
    pub fn transport(details: impl Into<String>) -> Self {
        MonitorError::Transport {
            details: details.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        details: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        MonitorError::Transport {
            details: details.into(),
            source: Some(source.into()),
        }
    }
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(ConfigValidationError::config(err.to_string()))
    }
}
