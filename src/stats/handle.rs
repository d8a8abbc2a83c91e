use tokio::sync::{mpsc, oneshot};

use crate::StatsError;

use super::{DeviceStatSnapshot, DeviceStatUpdate, StatsCommand};

/// Cloneable entry point to the stats manager, shared by every transport.
///
/// Reads and writes travel through the same queue, so a query issued after
/// an update has been acknowledged always observes that update.
#[derive(Debug, Clone)]
pub struct StatsHandle {
    command_tx: mpsc::Sender<StatsCommand>,
}

impl StatsHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<StatsCommand>) -> Self {
        Self { command_tx }
    }

    /// Apply an update and wait for the manager to acknowledge it
    pub async fn update_device_stats(&self, update: DeviceStatUpdate) -> Result<(), StatsError> {
        self.request(|response_tx| StatsCommand::Update {
            update,
            response_tx,
        })
        .await?
    }

    pub async fn get_device_stats(&self, device_id: &str) -> Result<DeviceStatSnapshot, StatsError> {
        self.request(|response_tx| StatsCommand::QueryDevice {
            device_id: device_id.to_string(),
            response_tx,
        })
        .await?
    }

    pub async fn list_devices(&self) -> Result<Vec<String>, StatsError> {
        self.request(|response_tx| StatsCommand::ListDevices { response_tx })
            .await
    }

    pub(crate) async fn send_command(&self, command: StatsCommand) -> Result<(), StatsError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| StatsError::internal("stats manager unavailable"))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> StatsCommand,
    ) -> Result<T, StatsError> {
        let (tx, rx) = oneshot::channel();

        self.send_command(command(tx)).await?;

        rx.await
            .map_err(|_| StatsError::internal("stats manager unavailable"))
    }
}
