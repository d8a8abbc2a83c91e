use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::{DeviceStatSnapshot, DeviceStatUpdate, MonitorError, StatsError, StatsHandle};

#[derive(Debug, Deserialize)]
struct HeartbeatRequest {
    #[serde(deserialize_with = "rfc3339_seconds")]
    sent_at: i64,
}

#[derive(Debug, Deserialize)]
struct UploadStatsRequest {
    #[serde(default, rename = "sent_at", deserialize_with = "optional_rfc3339_seconds")]
    _sent_at: Option<i64>,
    /// Upload duration in nanoseconds
    upload_time: i64,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    device_id: String,
    avg_upload_time: String,
    uptime: Option<f64>,
}

impl From<DeviceStatSnapshot> for StatsResponse {
    fn from(snapshot: DeviceStatSnapshot) -> Self {
        Self {
            device_id: snapshot.device_id,
            avg_upload_time: snapshot.average_upload_time,
            uptime: snapshot.uptime,
        }
    }
}

#[derive(Debug, Serialize)]
struct DevicesResponse {
    devices: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    devices: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    msg: String,
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Stats(StatsError),
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Stats(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Bad JSON: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Stats(err @ StatsError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Stats(err @ StatsError::Internal(_)) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unable to load device stats".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { msg })).into_response()
    }
}

fn rfc3339_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&raw, &Rfc3339)
        .map(OffsetDateTime::unix_timestamp)
        .map_err(serde::de::Error::custom)
}

fn optional_rfc3339_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => OffsetDateTime::parse(&raw, &Rfc3339)
            .map(|at| Some(at.unix_timestamp()))
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

async fn heartbeat_handler(
    State(stats): State<StatsHandle>,
    Path(device_id): Path<String>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;

    stats
        .update_device_stats(DeviceStatUpdate::heartbeat(device_id, request.sent_at))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_stats_handler(
    State(stats): State<StatsHandle>,
    Path(device_id): Path<String>,
    payload: Result<Json<UploadStatsRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    debug!("Upload from {}: {}ns", device_id, request.upload_time);

    stats
        .update_device_stats(DeviceStatUpdate::upload(device_id, request.upload_time))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn get_stats_handler(
    State(stats): State<StatsHandle>,
    Path(device_id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let snapshot = stats.get_device_stats(&device_id).await?;
    Ok(Json(snapshot.into()))
}

async fn list_devices_handler(
    State(stats): State<StatsHandle>,
) -> Result<Json<DevicesResponse>, ApiError> {
    let devices = stats.list_devices().await?;
    Ok(Json(DevicesResponse { devices }))
}

async fn health_handler(State(stats): State<StatsHandle>) -> Result<impl IntoResponse, ApiError> {
    let devices = stats.list_devices().await?.len();
    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            devices,
        }),
    ))
}

/// Routes for the device API. Device routes are served both at the root and
/// under `/api/v1`.
pub fn router(stats: StatsHandle) -> Router {
    let devices = Router::new()
        .route("/devices", get(list_devices_handler))
        .route("/devices/:device_id/heartbeat", post(heartbeat_handler))
        .route(
            "/devices/:device_id/stats",
            post(upload_stats_handler).get(get_stats_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .merge(devices.clone())
        .nest("/api/v1", devices)
        .layer(TraceLayer::new_for_http())
        .with_state(stats)
}

pub async fn serve(
    listener: TcpListener,
    stats: StatsHandle,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), MonitorError> {
    let addr = listener
        .local_addr()
        .map_err(|e| MonitorError::transport_with_source("HTTP listener has no address", e))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(stats))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| MonitorError::transport_with_source("HTTP server failed", e))?;

    Ok(())
}
