use serde::{Deserialize, Serialize};

use crate::ConfigValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Enable gRPC API
    pub enabled: bool,
    /// gRPC server address
    pub bind_addr: String,
    /// gRPC server port
    pub bind_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "0.0.0.0".to_string(),
            bind_port: 6734,
        }
    }
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.bind_addr.is_empty() {
            return Err(ConfigValidationError::rpc("bind_addr must not be empty"));
        }
        if self.bind_port == 0 {
            return Err(ConfigValidationError::rpc("bind_port must be non-zero"));
        }
        Ok(())
    }
}
