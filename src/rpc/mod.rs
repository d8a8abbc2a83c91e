mod client;
mod service;

pub use client::FleetMonitorClient;
pub use service::FleetMonitorService;

use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::info;

use crate::{MonitorError, StatsHandle};

/// Generated protobuf types for the `fleetmonitor` package
pub mod proto {
    tonic::include_proto!("fleetmonitor");
}

pub async fn serve(
    listener: TcpListener,
    stats: StatsHandle,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), MonitorError> {
    let addr = listener
        .local_addr()
        .map_err(|e| MonitorError::transport_with_source("gRPC listener has no address", e))?;

    info!("gRPC server listening on {}", addr);

    Server::builder()
        .add_service(FleetMonitorService::new(stats).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            let _ = shutdown_rx.recv().await;
            info!("gRPC server shutting down");
        })
        .await
        .map_err(|e| MonitorError::transport_with_source("gRPC server failed", e))?;

    Ok(())
}
