mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use fleet_monitor::http_api::router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::spawn_stats;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[tokio::test]
async fn test_heartbeat_upload_and_stats_flow() {
    let stats = spawn_stats(&["d1"]);
    let app = router(stats.handle.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/devices/d1/heartbeat",
        Some(json!({ "sent_at": "1970-01-01T00:16:40Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/devices/d1/heartbeat",
        Some(json!({ "sent_at": "1970-01-01T00:22:40Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for upload_time in [100, 200, 300] {
        let (status, _) = send(
            &app,
            "POST",
            "/devices/d1/stats",
            Some(json!({ "sent_at": "1970-01-01T00:23:00Z", "upload_time": upload_time })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, body) = send(&app, "GET", "/devices/d1/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["device_id"], "d1");
    assert_eq!(body["avg_upload_time"], "200ns");
    let uptime = body["uptime"].as_f64().unwrap();
    assert!((uptime - 2.0 / 6.0 * 100.0).abs() < 1e-9);

    let manager = stats.finish().await;
    let record = manager.table().lookup("d1").unwrap();
    assert_eq!(record.cumulative_heartbeat_minutes, 6);
    assert_eq!(record.number_of_heartbeats, 2);
}

#[tokio::test]
async fn test_unknown_device_returns_not_found() {
    let stats = spawn_stats(&["d1"]);
    let app = router(stats.handle.clone());

    let (status, body) = send(&app, "GET", "/devices/ghost/stats", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "device ghost: not found");

    let (status, _) = send(
        &app,
        "POST",
        "/devices/ghost/heartbeat",
        Some(json!({ "sent_at": "2024-12-01T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/devices/ghost/stats",
        Some(json!({ "upload_time": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let manager = stats.finish().await;
    assert_eq!(manager.table().device_ids(), vec!["d1"]);
}

#[tokio::test]
async fn test_bad_payloads_return_bad_request() {
    let stats = spawn_stats(&["d1"]);
    let app = router(stats.handle.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/devices/d1/heartbeat",
        Some(json!({ "sent_at": "not a timestamp" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].as_str().unwrap().starts_with("Bad JSON"));

    let (status, _) = send(
        &app,
        "POST",
        "/devices/d1/stats",
        Some(json!({ "upload_time": "fast" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/devices/d1/stats",
        Some(json!({ "sent_at": "garbage", "upload_time": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].as_str().unwrap().starts_with("Bad JSON"));

    // Missing content type
    let (status, _) = send(&app, "POST", "/devices/d1/heartbeat", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let manager = stats.finish().await;
    let record = manager.table().lookup("d1").unwrap();
    assert_eq!(record.number_of_heartbeats, 0);
    assert_eq!(record.number_of_uploads, 0);
}

#[tokio::test]
async fn test_stats_before_any_heartbeat() {
    let stats = spawn_stats(&["d1"]);
    let app = router(stats.handle.clone());

    let (status, body) = send(&app, "GET", "/devices/d1/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avg_upload_time"], "0s");
    assert!(body["uptime"].is_null());

    stats.finish().await;
}

#[tokio::test]
async fn test_versioned_routes_listing_and_health() {
    let stats = spawn_stats(&["d2", "d1"]);
    let app = router(stats.handle.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/devices/d2/stats",
        Some(json!({ "upload_time": 310_000_000_000i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/v1/devices/d2/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avg_upload_time"], "5m10s");

    let (status, body) = send(&app, "GET", "/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["devices"], json!(["d1", "d2"]));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "devices": 2 }));

    stats.finish().await;
}

#[tokio::test]
async fn test_stopped_manager_returns_internal_error() {
    let stats = spawn_stats(&["d1"]);
    let app = router(stats.handle.clone());
    stats.finish().await;

    let (status, body) = send(&app, "GET", "/devices/d1/stats", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["msg"], "unable to load device stats");
}
