use thiserror::Error;

/// Failures surfaced by the stats store and its façade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("device {0}: not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StatsError {
    pub fn not_found(device_id: impl Into<String>) -> Self {
        StatsError::NotFound(device_id.into())
    }

    pub fn internal(details: impl Into<String>) -> Self {
        StatsError::Internal(details.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StatsError::NotFound(_))
    }
}
