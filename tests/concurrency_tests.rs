mod common;

use std::time::Duration;

use fleet_monitor::{DeviceStatUpdate, StatsError};

use common::spawn_stats;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_never_lost() {
    const CALLERS: i64 = 200;

    let stats = spawn_stats(&["d1", "d2"]);

    let mut callers = Vec::new();
    for i in 0..CALLERS {
        let handle = stats.handle.clone();
        callers.push(tokio::spawn(async move {
            // Every caller sends one combined update and one ghost update
            let combined = DeviceStatUpdate {
                device_id: "d1".to_string(),
                heartbeat_time: Some(1_000 + i * 30),
                upload_duration: Some(1_000),
            };
            let applied = handle.update_device_stats(combined).await;
            let rejected = handle
                .update_device_stats(DeviceStatUpdate::upload("ghost", i))
                .await;
            (applied, rejected)
        }));
    }

    for caller in callers {
        let (applied, rejected) = caller.await.unwrap();
        assert_eq!(applied, Ok(()));
        assert_eq!(rejected, Err(StatsError::not_found("ghost")));
    }

    let snapshot = stats.handle.get_device_stats("d1").await.unwrap();
    assert_eq!(snapshot.number_of_heartbeats, CALLERS as u64);
    assert_eq!(snapshot.number_of_uploads, CALLERS as u64);
    assert_eq!(snapshot.average_upload_time, "1µs");

    let untouched = stats.handle.get_device_stats("d2").await.unwrap();
    assert_eq!(untouched.number_of_heartbeats, 0);
    assert_eq!(untouched.number_of_uploads, 0);

    let manager = stats.finish().await;
    assert_eq!(manager.table().len(), 2);
    // 2 updates per caller plus the two queries
    assert_eq!(manager.processed(), 2 * CALLERS as u64 + 2);

    let record = manager.table().lookup("d1").unwrap();
    let first = record.first_heartbeat_at_seconds.unwrap();
    assert!((1_000..1_000 + CALLERS * 30).contains(&first));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_read_after_acknowledged_update_sees_it() {
    let stats = spawn_stats(&["d1"]);

    for n in 1..=50u64 {
        stats
            .handle
            .update_device_stats(DeviceStatUpdate::upload("d1", 10))
            .await
            .unwrap();

        let snapshot = stats.handle.get_device_stats("d1").await.unwrap();
        assert_eq!(snapshot.number_of_uploads, n);
    }

    stats.finish().await;
}

#[tokio::test]
async fn test_cancelled_callers_do_not_block_others() {
    let stats = spawn_stats(&["d1"]);

    // Callers abandoned mid-flight
    for i in 0..20 {
        let handle = stats.handle.clone();
        let caller = tokio::spawn(async move {
            handle
                .update_device_stats(DeviceStatUpdate::heartbeat("d1", 1_000 + i))
                .await
        });
        // Let the caller enqueue its command and park on the reply before aborting it
        tokio::task::yield_now().await;
        caller.abort();
        let outcome = caller.await;
        assert!(outcome.map_or_else(|e| e.is_cancelled(), |r| r.is_ok()));
    }

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        stats
            .handle
            .update_device_stats(DeviceStatUpdate::upload("d1", 42)),
    )
    .await
    .expect("manager must keep serving after callers are cancelled");
    assert_eq!(result, Ok(()));

    let snapshot = stats.handle.get_device_stats("d1").await.unwrap();
    assert_eq!(snapshot.number_of_uploads, 1);
    // Commands from abandoned callers are still applied
    assert_eq!(snapshot.number_of_heartbeats, 20);

    let manager = stats.finish().await;
    assert_eq!(manager.processed(), 20 + 2);
}
