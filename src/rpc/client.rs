use std::time::SystemTime;

use tonic::{transport::Channel, Request, Status};

use crate::MonitorError;

use super::proto::{
    fleet_monitor_client::FleetMonitorClient as GrpcClient, GetStatsRequest, GetStatsResponse,
    HeartbeatRequest, UploadStatsRequest,
};

/// Thin typed wrapper around the generated gRPC client
#[derive(Debug, Clone)]
pub struct FleetMonitorClient {
    client: GrpcClient<Channel>,
}

impl FleetMonitorClient {
    /// Connect to a server, e.g. `"http://127.0.0.1:6734"`
    pub async fn connect(addr: impl Into<String>) -> Result<Self, MonitorError> {
        let addr = addr.into();
        let client = GrpcClient::connect(addr.clone()).await.map_err(|e| {
            MonitorError::transport_with_source(format!("Failed to connect to {}", addr), e)
        })?;

        Ok(Self { client })
    }

    pub async fn send_heartbeat(
        &mut self,
        device_id: impl Into<String>,
        sent_at: SystemTime,
    ) -> Result<String, Status> {
        let response = self
            .client
            .send_heartbeat(Request::new(HeartbeatRequest {
                device_id: device_id.into(),
                sent_at: Some(sent_at.into()),
            }))
            .await?;

        Ok(response.into_inner().message)
    }

    pub async fn upload_stats(
        &mut self,
        device_id: impl Into<String>,
        upload_time_nanos: i64,
    ) -> Result<String, Status> {
        let response = self
            .client
            .upload_stats(Request::new(UploadStatsRequest {
                device_id: device_id.into(),
                upload_time: upload_time_nanos,
            }))
            .await?;

        Ok(response.into_inner().message)
    }

    pub async fn get_stats(
        &mut self,
        device_id: impl Into<String>,
    ) -> Result<GetStatsResponse, Status> {
        let response = self
            .client
            .get_stats(Request::new(GetStatsRequest {
                device_id: device_id.into(),
            }))
            .await?;

        Ok(response.into_inner())
    }
}
