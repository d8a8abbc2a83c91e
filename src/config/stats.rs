use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Device roster, one id per line
    pub roster_path: PathBuf,
    /// Capacity of the stats manager command queue
    pub queue_capacity: usize,
    /// How long to wait for tasks to finish on shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("devices.csv"),
            queue_capacity: 1024,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.roster_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::stats("roster_path must not be empty"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigValidationError::stats("queue_capacity cannot be 0"));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(ConfigValidationError::stats("shutdown_timeout cannot be 0"));
        }
        Ok(())
    }
}
