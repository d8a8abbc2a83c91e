use std::{future::Future, net::SocketAddr};

use tokio::{
    net::TcpListener,
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::MonitorConfig, http_api, roster::load_roster, rpc, MonitorError, StatsHandle,
    StatsManager, StatsTable,
};

/// Local addresses the transports ended up listening on
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenAddrs {
    pub http: Option<SocketAddr>,
    pub rpc: Option<SocketAddr>,
}

/// Owns the stats manager task and both transports.
pub struct FleetMonitor {
    config: MonitorConfig,
    stats: StatsHandle,
    shutdown: broadcast::Sender<()>,
    stats_shutdown: watch::Sender<bool>,
    stats_task: Mutex<Option<JoinHandle<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FleetMonitor {
    /// Load the roster from `stats.roster_path` and start the stats manager.
    pub async fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;

        let table = load_roster(&config.stats.roster_path).await?;
        Ok(Self::with_table(config, table))
    }

    /// Start the stats manager over an already seeded table.
    pub fn with_table(config: MonitorConfig, table: StatsTable) -> Self {
        let (mut manager, stats) = StatsManager::new(table, &config.stats);
        let (stats_shutdown, stats_shutdown_rx) = watch::channel(false);

        let stats_task = tokio::spawn(async move {
            manager.run(stats_shutdown_rx).await;
        });

        Self {
            config,
            stats,
            shutdown: broadcast::channel(1).0,
            stats_shutdown,
            stats_task: Mutex::new(Some(stats_task)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn stats(&self) -> StatsHandle {
        self.stats.clone()
    }

    async fn spawn_task<F>(&self, name: &str, future: F)
    where
        F: Future<Output = Result<(), MonitorError>> + Send + 'static,
    {
        let name = name.to_string();
        let task = tokio::spawn(async move {
            if let Err(e) = future.await {
                error!("{} task failed: {}", name, e);
            }
        });
        debug!("Spawned task: {:?}", task.id());

        self.tasks.lock().await.push(task);
    }

    async fn bind(addr: &str) -> Result<TcpListener, MonitorError> {
        TcpListener::bind(addr).await.map_err(|e| {
            MonitorError::transport_with_source(format!("Failed to bind to address {}", addr), e)
        })
    }

    /// Bind the enabled transports and serve them in background tasks.
    pub async fn start(&self) -> Result<ListenAddrs, MonitorError> {
        let mut addrs = ListenAddrs::default();

        // Bind everything first so a bad address fails before anything serves
        let http_listener = if self.config.http.enabled {
            Some(Self::bind(&self.config.http.address()).await?)
        } else {
            None
        };
        let rpc_listener = if self.config.rpc.enabled {
            Some(Self::bind(&self.config.rpc.address()).await?)
        } else {
            None
        };

        if let Some(listener) = http_listener {
            addrs.http = listener.local_addr().ok();
            self.spawn_task(
                "http",
                http_api::serve(listener, self.stats(), self.shutdown.subscribe()),
            )
            .await;
        }

        if let Some(listener) = rpc_listener {
            addrs.rpc = listener.local_addr().ok();
            self.spawn_task(
                "rpc",
                rpc::serve(listener, self.stats(), self.shutdown.subscribe()),
            )
            .await;
        }

        info!(
            "Fleet monitor started (http: {:?}, rpc: {:?})",
            addrs.http, addrs.rpc
        );

        Ok(addrs)
    }

    /// Graceful shutdown: transports finish in-flight requests first, then
    /// the stats manager answers whatever is still queued and stops.
    pub async fn shutdown(&self) -> Result<(), MonitorError> {
        info!("Initiating graceful shutdown");
        let timeout_duration = self.config.stats.shutdown_timeout;

        if let Ok(devices) = self.stats.list_devices().await {
            info!("Tracking {} devices", devices.len());
        }

        // Nobody listening just means no transport was started
        let _ = self.shutdown.send(());

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        match tokio::time::timeout(timeout_duration, futures::future::join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!("Transport task panicked: {}", e);
                    }
                }
            }
            Err(_) => warn!(
                "Transports did not stop within {:?}, continuing shutdown",
                timeout_duration
            ),
        }

        let _ = self.stats_shutdown.send(true);

        if let Some(task) = self.stats_task.lock().await.take() {
            match tokio::time::timeout(timeout_duration, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Stats manager task panicked: {}", e),
                Err(_) => {
                    return Err(MonitorError::transport(
                        "Stats manager did not stop in time",
                    ))
                }
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}

/// Run until `signal` resolves, then shut down gracefully.
pub async fn run_until<S>(monitor: &FleetMonitor, signal: S) -> Result<(), MonitorError>
where
    S: Future<Output = ()>,
{
    monitor.start().await?;
    signal.await;
    info!("Shutdown signal received");
    monitor.shutdown().await
}
