use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{config::StatsConfig, StatsError};

use super::{DeviceStatSnapshot, DeviceStatUpdate, StatsCommand, StatsHandle, StatsTable};

/// Sole owner of the stats table.
///
/// Commands arrive on one FIFO queue and are applied strictly one at a time,
/// so every read-modify-write of a record is atomic with respect to all other
/// commands and no locking is needed.
pub struct StatsManager {
    table: StatsTable,
    command_rx: mpsc::Receiver<StatsCommand>,
    processed: u64,
}

impl StatsManager {
    pub fn new(table: StatsTable, config: &StatsConfig) -> (Self, StatsHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);

        let manager = Self {
            table,
            command_rx: rx,
            processed: 0,
        };

        (manager, StatsHandle::new(tx))
    }

    pub fn table(&self) -> &StatsTable {
        &self.table
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub async fn run(&mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Stats manager started with {} devices", self.table.len());

        loop {
            tokio::select! {
                shutdown = shutdown_rx.changed() => {
                    match shutdown {
                        Ok(_) => info!("Stats manager shutting down"),
                        Err(e) => warn!("Shutdown channel closed: {}", e),
                    }
                    self.drain().await;
                    break;
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            info!("All stats handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        info!(
            "Stats manager shutdown complete, {} commands processed",
            self.processed
        );
    }

    /// Refuse new commands, then answer everything already queued.
    async fn drain(&mut self) {
        self.command_rx.close();
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: StatsCommand) {
        self.processed = self.processed.saturating_add(1);

        match command {
            StatsCommand::Update {
                update,
                response_tx,
            } => {
                let device_id = update.device_id.clone();
                let result = self.apply_update(&update);
                if response_tx.send(result).is_err() {
                    warn!("Update caller for {} went away before the reply", device_id);
                }
            }

            StatsCommand::QueryDevice {
                device_id,
                response_tx,
            } => {
                let result = self.query_device(&device_id);
                if response_tx.send(result).is_err() {
                    warn!("Query caller for {} went away before the reply", device_id);
                }
            }

            StatsCommand::ListDevices { response_tx } => {
                if response_tx.send(self.table.device_ids()).is_err() {
                    warn!("Failed to send device list");
                }
            }
        }
    }

    fn apply_update(&mut self, update: &DeviceStatUpdate) -> Result<(), StatsError> {
        let mut record = self
            .table
            .lookup(&update.device_id)
            .cloned()
            .ok_or_else(|| StatsError::not_found(&update.device_id))?;

        record.apply(update);

        debug!(
            device_id = %record.device_id,
            heartbeats = record.number_of_heartbeats,
            uploads = record.number_of_uploads,
            minutes = record.cumulative_heartbeat_minutes,
            avg_upload_ns = record.average_upload_time_nanos,
            "Applied device update"
        );

        if self.table.replace(record) {
            Ok(())
        } else {
            Err(StatsError::internal(format!(
                "record for {} disappeared during update",
                update.device_id
            )))
        }
    }

    fn query_device(&self, device_id: &str) -> Result<DeviceStatSnapshot, StatsError> {
        self.table
            .lookup(device_id)
            .map(|record| record.snapshot())
            .ok_or_else(|| StatsError::not_found(device_id))
    }
}
