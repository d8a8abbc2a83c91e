use serde::Serialize;

/// A single change to a device's aggregates. Either field may be absent;
/// an update carrying neither is accepted and changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatUpdate {
    pub device_id: String,
    /// Heartbeat timestamp, seconds since the Unix epoch
    pub heartbeat_time: Option<i64>,
    /// Upload duration in nanoseconds
    pub upload_duration: Option<i64>,
}

impl DeviceStatUpdate {
    pub fn heartbeat(device_id: impl Into<String>, sent_at_seconds: i64) -> Self {
        Self {
            device_id: device_id.into(),
            heartbeat_time: Some(sent_at_seconds),
            upload_duration: None,
        }
    }

    pub fn upload(device_id: impl Into<String>, duration_nanos: i64) -> Self {
        Self {
            device_id: device_id.into(),
            heartbeat_time: None,
            upload_duration: Some(duration_nanos),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heartbeat_time.is_none() && self.upload_duration.is_none()
    }
}

/// Presentation view of a device's aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatSnapshot {
    pub device_id: String,
    /// Mean upload time, e.g. `"5m10s"`
    #[serde(rename = "avg_upload_time")]
    pub average_upload_time: String,
    /// Heartbeats per elapsed minute as a percentage; `None` before the
    /// first heartbeat
    pub uptime: Option<f64>,
    pub number_of_heartbeats: u64,
    pub number_of_uploads: u64,
    pub cumulative_heartbeat_minutes: i64,
}
