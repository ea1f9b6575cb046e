//! 连通性监控集成测试

mod common;

use async_trait::async_trait;
use common::{config_for, init_test_logger, request_count, unreachable_config};
use rag_assistant_client::rag::health::ConnectivityListener;
use rag_assistant_client::{ConnectivityMonitor, ConnectivityStatus};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn healthy() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "database": "connected"}))
}

/// 记录所有状态变化
#[derive(Default)]
struct RecordingListener {
    seen: Mutex<Vec<ConnectivityStatus>>,
}

#[async_trait]
impl ConnectivityListener for RecordingListener {
    async fn on_status_changed(&self, status: ConnectivityStatus) {
        self.seen.lock().await.push(status);
    }
}

#[tokio::test]
async fn test_healthy_backend_is_connected() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .mount(&server)
        .await;

    let listener = Arc::new(RecordingListener::default());
    let monitor =
        ConnectivityMonitor::with_listener(&config_for(&server), reqwest::Client::new(), listener.clone());
    assert!(monitor.status().is_checking());

    let status = monitor.check_now().await;
    let ConnectivityStatus::Connected(detail) = &status else {
        panic!("expected connected, got {:?}", status);
    };
    assert_eq!(detail.api_url, server.uri());
    assert_eq!(detail.backend_status, "healthy");
    assert_eq!(detail.database, "connected");
    assert_eq!(monitor.status(), status);

    let seen = listener.seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_checking());
    assert!(seen[1].is_connected());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    // 超时为 300ms
    let config = config_for(&server);
    let monitor = ConnectivityMonitor::new(&config, reqwest::Client::new());

    let started = tokio::time::Instant::now();
    let status = monitor.check_now().await;
    assert!(started.elapsed() < Duration::from_secs(1));

    let ConnectivityStatus::Error(detail) = status else {
        panic!("expected error");
    };
    assert_eq!(detail.error, "Cannot reach backend");
    assert!(detail.suggestion.contains(&config.backend_start_hint));
}

#[tokio::test]
async fn test_unreachable_backend() {
    init_test_logger();
    let config = unreachable_config();
    let monitor = ConnectivityMonitor::new(&config, reqwest::Client::new());

    let ConnectivityStatus::Error(detail) = monitor.check_now().await else {
        panic!("expected error");
    };
    assert_eq!(detail.api_url, "http://127.0.0.1:1");
    assert_eq!(detail.error, "Cannot reach backend");
    assert_eq!(
        detail.suggestion,
        format!("Make sure backend is running: {}", config.backend_start_hint)
    );
}

#[tokio::test]
async fn test_server_error_points_at_backend_logs() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let monitor = ConnectivityMonitor::new(&config_for(&server), reqwest::Client::new());
    let ConnectivityStatus::Error(detail) = monitor.check_now().await else {
        panic!("expected error");
    };
    assert_eq!(detail.error, "db down");
    assert_eq!(detail.suggestion, "Check backend logs for errors");
}

#[tokio::test]
async fn test_manual_retry_recovers() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .mount(&server)
        .await;

    let monitor = ConnectivityMonitor::new(&config_for(&server), reqwest::Client::new());
    assert!(monitor.check_now().await.is_error());
    assert!(monitor.check_now().await.is_connected());
}

#[tokio::test]
async fn test_polling_runs_until_stopped() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .mount(&server)
        .await;

    let config = config_for(&server).with_health_poll_interval(Duration::from_millis(100));
    let monitor = ConnectivityMonitor::new(&config, reqwest::Client::new());
    let mut rx = monitor.subscribe();

    monitor.start().await;
    monitor.start().await;
    assert!(monitor.is_running().await);

    // 启动时立即检查一次
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            rx.changed().await.expect("monitor dropped");
            if rx.borrow_and_update().is_connected() {
                break;
            }
        }
    })
    .await
    .expect("never connected");

    tokio::time::sleep(Duration::from_millis(320)).await;
    let polled = request_count(&server, "GET", "/health").await;
    assert!((3..=6).contains(&polled), "polled {} times", polled);

    monitor.stop().await;
    assert!(!monitor.is_running().await);
    let after_stop = request_count(&server, "GET", "/health").await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(request_count(&server, "GET", "/health").await, after_stop);
}

#[tokio::test]
async fn test_dropping_monitor_stops_polling() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .mount(&server)
        .await;

    let config = config_for(&server).with_health_poll_interval(Duration::from_millis(100));
    let monitor = ConnectivityMonitor::new(&config, reqwest::Client::new());
    monitor.start().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    drop(monitor);

    let after_drop = request_count(&server, "GET", "/health").await;
    assert!(after_drop >= 1);
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(request_count(&server, "GET", "/health").await, after_drop);
}

#[tokio::test]
async fn test_service_info() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("operationID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service": "Resume RAG API",
            "status": "running",
            "version": "1.0.0"
        })))
        .mount(&server)
        .await;

    let monitor = ConnectivityMonitor::new(&config_for(&server), reqwest::Client::new());
    let info = monitor.service_info().await.expect("service info failed");
    assert_eq!(info.service, "Resume RAG API");
    assert_eq!(info.version, "1.0.0");
}

#[tokio::test]
async fn test_older_probe_finishing_late_is_discarded() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(250)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .mount(&server)
        .await;

    let listener = Arc::new(RecordingListener::default());
    let monitor = Arc::new(ConnectivityMonitor::with_listener(
        &config_for(&server),
        reqwest::Client::new(),
        listener.clone(),
    ));

    let slow = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.check_now().await })
    };
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(monitor.check_now().await.is_connected());

    // 慢的旧探测失败返回，但不能覆盖新结果
    let late = slow.await.expect("probe task panicked");
    assert!(late.is_connected());
    assert!(monitor.status().is_connected());
    assert!(!listener.seen.lock().await.iter().any(|s| s.is_error()));
}
