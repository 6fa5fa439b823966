//! Integration tests for the router monitor lifecycle

use std::time::Duration;

use routerwatch_core::monitoring::{MetricKey, MetricValue};
use routerwatch_core::testing::ScriptedTransport;
use routerwatch_core::{
    ConfigManager, MonitorParams, PollFailure, RemoteEndpoint, RouterMonitor, RouterSettings,
    RouterWatchError, SessionTimeouts, test_connection,
};
use tempfile::TempDir;

use super::handle_with;

fn params(interval: Duration) -> MonitorParams {
    MonitorParams {
        endpoint: RemoteEndpoint::new("192.168.1.1", "admin", "secret".to_string()),
        timeouts: SessionTimeouts::default(),
        interval,
        known_hosts_path: None,
    }
}

#[tokio::test]
async fn setup_exposes_first_snapshot() {
    let transport = ScriptedTransport::router_fixture();
    let monitor = RouterMonitor::setup_with_transport(
        &params(Duration::from_secs(30)),
        Box::new(transport.clone()),
    )
    .await
    .unwrap();

    let snapshot = monitor.last_snapshot().unwrap();
    assert_eq!(
        snapshot.value(&MetricKey::CpuLoad1),
        Some(MetricValue::Float(0.15))
    );
    assert_eq!(
        snapshot.value(&"eth0_rx_bytes".parse().unwrap()),
        Some(MetricValue::Integer(987_654_321))
    );
    assert_eq!(MetricKey::catalog(&snapshot).len(), MetricKey::FIXED.len() + 6);
    assert!(monitor.last_result().unwrap().is_success());

    monitor.shutdown().await;
}

#[tokio::test]
async fn setup_failure_leaves_nothing_running() {
    let transport = ScriptedTransport::router_fixture();
    transport.set_connect_fails(true);

    let result = RouterMonitor::setup_with_transport(
        &params(Duration::from_millis(20)),
        Box::new(transport.clone()),
    )
    .await;
    assert!(matches!(
        result,
        Err(RouterWatchError::FirstRefresh(PollFailure::Connect(_)))
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.connect_count(), 1);
}

#[tokio::test]
async fn timer_keeps_polling_after_setup() {
    let transport = ScriptedTransport::router_fixture();
    let monitor = RouterMonitor::setup_with_transport(
        &params(Duration::from_millis(40)),
        Box::new(transport.clone()),
    )
    .await
    .unwrap();
    let mut rx = monitor.subscribe();

    transport.set_connect_fails(true);
    rx.changed().await.unwrap();
    assert!(!monitor.last_update_success());
    assert!(monitor.last_snapshot().is_some());

    transport.set_connect_fails(false);
    rx.changed().await.unwrap();
    assert!(monitor.last_update_success());

    monitor.shutdown().await;
}

#[tokio::test]
async fn manual_refresh_and_reboot() {
    let transport = ScriptedTransport::router_fixture();
    let monitor = RouterMonitor::setup_with_transport(
        &params(Duration::from_secs(30)),
        Box::new(transport.clone()),
    )
    .await
    .unwrap();

    assert!(monitor.refresh().await.is_success());
    assert_eq!(transport.connect_count(), 2);
    assert!(monitor.reboot().await);

    monitor.shutdown().await;
}

#[tokio::test]
async fn connection_test_reports_reachability() {
    let transport = ScriptedTransport::new();
    let session = handle_with(&transport);
    assert!(test_connection(&session).await);

    transport.set_connect_fails(true);
    assert!(!test_connection(&session).await);
    assert!(transport.executed_commands().is_empty());
}

#[test]
fn params_follow_saved_settings() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let mut settings = RouterSettings::default();
    settings.router.host = "router.lan".to_string();
    settings.polling.interval_secs = 90;
    manager.save_settings(&settings).unwrap();

    let mut loaded = manager.load_settings().unwrap();
    assert!(MonitorParams::from_settings(&loaded, &manager).is_err());

    loaded.router.password = Some("pw".to_string().into());
    let params = MonitorParams::from_settings(&loaded, &manager).unwrap();
    assert_eq!(params.endpoint.address(), "router.lan:22");
    assert_eq!(params.interval, Duration::from_secs(90));
    assert_eq!(
        params.known_hosts_path,
        Some(dir.path().join("known_hosts"))
    );
}
