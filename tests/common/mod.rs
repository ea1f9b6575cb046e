//! 集成测试公共工具

#![allow(dead_code)]

use rag_assistant_client::ClientConfig;
use std::sync::Once;
use std::time::Duration;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        // 关闭底层 HTTP 客户端的 debug 噪音
        let filter_layer = EnvFilter::new(
            "info,rag_assistant_client=debug,hyper_util::client=info,reqwest=info",
        );

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_test_writer();

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    });
}

/// 指向 mock 服务器的配置，横幅清除延迟缩短到测试可等待的范围
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_api_base_url(server.uri())
        .with_status_clear_delay(Duration::from_millis(200))
        .with_health_timeout(Duration::from_millis(300))
}

/// 没有任何服务监听的地址
pub fn unreachable_config() -> ClientConfig {
    ClientConfig::default().with_api_base_url("http://127.0.0.1:1")
}

/// 已收到的 `method path` 请求数
pub async fn request_count(server: &MockServer, method: &str, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == method && r.url.path() == path)
        .count()
}

pub async fn total_requests(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

pub fn document_json(id: &str, title: &str, chunks: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "category": "resume",
        "chunk_count": chunks,
        "created_at": "2024-01-15T10:30:00.123456"
    })
}
