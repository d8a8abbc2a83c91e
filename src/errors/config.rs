use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("HTTP configuration error: {0}")]
    Http(String),

    #[error("RPC configuration error: {0}")]
    Rpc(String),

    #[error("Stats configuration error: {0}")]
    Stats(String),

    #[error("Logging configuration error: {0}")]
    Logging(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConfigValidationError {
    pub fn http(details: impl Into<String>) -> Self {
        Self::Http(details.into())
    }

    pub fn rpc(details: impl Into<String>) -> Self {
        Self::Rpc(details.into())
    }

    pub fn stats(details: impl Into<String>) -> Self {
        Self::Stats(details.into())
    }

    pub fn logging(details: impl Into<String>) -> Self {
        Self::Logging(details.into())
    }

    pub fn config(details: impl Into<String>) -> Self {
        Self::Config(details.into())
    }
}
