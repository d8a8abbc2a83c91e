#![allow(dead_code)]

use fleet_monitor::{config::StatsConfig, StatsHandle, StatsManager, StatsTable};
use tokio::{sync::watch, task::JoinHandle};

pub struct TestStats {
    pub handle: StatsHandle,
    pub shutdown_tx: watch::Sender<bool>,
    pub task: JoinHandle<StatsManager>,
}

impl TestStats {
    /// Stop the manager and hand it back for inspection
    pub async fn finish(self) -> StatsManager {
        self.shutdown_tx.send(true).unwrap();
        self.task.await.unwrap()
    }
}

pub fn spawn_stats(devices: &[&str]) -> TestStats {
    let (mut manager, handle) = StatsManager::new(
        StatsTable::seed(devices.iter().copied()),
        &StatsConfig::default(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        manager.run(shutdown_rx).await;
        manager
    });

    TestStats {
        handle,
        shutdown_tx,
        task,
    }
}
