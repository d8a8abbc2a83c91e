use tonic::{Request, Response, Status};
use tracing::{debug, error};

use crate::{DeviceStatUpdate, StatsError, StatsHandle};

use super::proto::{
    fleet_monitor_server::{FleetMonitor, FleetMonitorServer},
    GetStatsRequest, GetStatsResponse, HeartbeatRequest, HeartbeatResponse, UploadStatsRequest,
    UploadStatsResponse,
};

/// gRPC front end of the stats store
#[derive(Debug, Clone)]
pub struct FleetMonitorService {
    stats: StatsHandle,
}

impl FleetMonitorService {
    pub fn new(stats: StatsHandle) -> Self {
        Self { stats }
    }

    pub fn into_server(self) -> FleetMonitorServer<Self> {
        FleetMonitorServer::new(self)
    }
}

fn require_device_id(device_id: &str) -> Result<(), Status> {
    if device_id.is_empty() {
        return Err(Status::invalid_argument("device_id is required"));
    }
    Ok(())
}

fn to_status(err: StatsError) -> Status {
    match err {
        StatsError::NotFound(_) => Status::not_found(err.to_string()),
        StatsError::Internal(_) => {
            error!("RPC failed: {}", err);
            Status::internal("unable to load device stats")
        }
    }
}

#[tonic::async_trait]
impl FleetMonitor for FleetMonitorService {
    async fn send_heartbeat(
        &self,
        request: Request<HeartbeatRequest>,
    ) -> Result<Response<HeartbeatResponse>, Status> {
        let req = request.into_inner();
        require_device_id(&req.device_id)?;

        let sent_at = req
            .sent_at
            .ok_or_else(|| Status::invalid_argument("sent_at is required"))?;

        self.stats
            .update_device_stats(DeviceStatUpdate::heartbeat(req.device_id, sent_at.seconds))
            .await
            .map_err(to_status)?;

        Ok(Response::new(HeartbeatResponse {
            message: "heartbeat received".to_string(),
        }))
    }

    async fn upload_stats(
        &self,
        request: Request<UploadStatsRequest>,
    ) -> Result<Response<UploadStatsResponse>, Status> {
        let req = request.into_inner();
        require_device_id(&req.device_id)?;
        debug!("Upload from {}: {}ns", req.device_id, req.upload_time);

        self.stats
            .update_device_stats(DeviceStatUpdate::upload(req.device_id, req.upload_time))
            .await
            .map_err(to_status)?;

        Ok(Response::new(UploadStatsResponse {
            message: "stats uploaded successfully".to_string(),
        }))
    }

    async fn get_stats(
        &self,
        request: Request<GetStatsRequest>,
    ) -> Result<Response<GetStatsResponse>, Status> {
        let req = request.into_inner();
        require_device_id(&req.device_id)?;

        let snapshot = self
            .stats
            .get_device_stats(&req.device_id)
            .await
            .map_err(to_status)?;

        Ok(Response::new(GetStatsResponse {
            device_id: snapshot.device_id,
            avg_upload_time: snapshot.average_upload_time,
            uptime: snapshot.uptime,
        }))
    }
}
