use tokio::sync::oneshot;

use crate::StatsError;

use super::{DeviceStatSnapshot, DeviceStatUpdate};

#[derive(Debug)]
pub enum StatsCommand {
    /// Apply an update to a device's aggregates
    Update {
        update: DeviceStatUpdate,
        response_tx: oneshot::Sender<Result<(), StatsError>>,
    },
    /// Query the snapshot of a specific device
    QueryDevice {
        device_id: String,
        response_tx: oneshot::Sender<Result<DeviceStatSnapshot, StatsError>>,
    },
    /// List every known device id
    ListDevices {
        response_tx: oneshot::Sender<Vec<String>>,
    },
}
