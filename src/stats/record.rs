use super::{format_duration, DeviceStatSnapshot, DeviceStatUpdate};

/// Running aggregates for a single device.
///
/// No raw history is kept: heartbeat elapsed time is recomputed from the
/// first heartbeat and the upload average is maintained incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatRecord {
    pub device_id: String,
    pub number_of_heartbeats: u64,
    pub number_of_uploads: u64,
    /// Set once, by the first heartbeat
    pub first_heartbeat_at_seconds: Option<i64>,
    /// Whole minutes between the first and the latest heartbeat
    pub cumulative_heartbeat_minutes: i64,
    pub average_upload_time_nanos: i64,
}

impl DeviceStatRecord {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            number_of_heartbeats: 0,
            number_of_uploads: 0,
            first_heartbeat_at_seconds: None,
            cumulative_heartbeat_minutes: 0,
            average_upload_time_nanos: 0,
        }
    }

    /// Fold an update into the aggregates.
    pub fn apply(&mut self, update: &DeviceStatUpdate) {
        if update.is_empty() {
            return;
        }

        if let Some(sent_at) = update.heartbeat_time {
            self.record_heartbeat(sent_at);
        }

        if let Some(duration) = update.upload_duration {
            self.record_upload(duration);
        }
    }

    fn record_heartbeat(&mut self, sent_at: i64) {
        let first = *self.first_heartbeat_at_seconds.get_or_insert(sent_at);
        self.number_of_heartbeats = self.number_of_heartbeats.saturating_add(1);
        self.cumulative_heartbeat_minutes = sent_at.saturating_sub(first).div_euclid(60);
    }

    fn record_upload(&mut self, duration: i64) {
        self.number_of_uploads = self.number_of_uploads.saturating_add(1);

        // Widened so the delta cannot overflow; the new mean always lies
        // between the old mean and `duration`, so it fits back into i64.
        let delta = i128::from(duration) - i128::from(self.average_upload_time_nanos);
        let step = delta / i128::from(self.number_of_uploads);
        self.average_upload_time_nanos = (i128::from(self.average_upload_time_nanos) + step) as i64;
    }

    /// Heartbeats received per elapsed minute, as a percentage.
    ///
    /// `None` until the first heartbeat. While the elapsed time is still
    /// under a minute the device is reported fully up.
    pub fn uptime(&self) -> Option<f64> {
        if self.number_of_heartbeats == 0 {
            return None;
        }

        if self.cumulative_heartbeat_minutes <= 0 {
            return Some(100.0);
        }

        Some(self.number_of_heartbeats as f64 / self.cumulative_heartbeat_minutes as f64 * 100.0)
    }

    pub fn snapshot(&self) -> DeviceStatSnapshot {
        DeviceStatSnapshot {
            device_id: self.device_id.clone(),
            average_upload_time: format_duration(self.average_upload_time_nanos),
            uptime: self.uptime(),
            number_of_heartbeats: self.number_of_heartbeats,
            number_of_uploads: self.number_of_uploads,
            cumulative_heartbeat_minutes: self.cumulative_heartbeat_minutes,
        }
    }
}
