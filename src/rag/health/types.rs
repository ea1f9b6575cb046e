//! 健康检查 API DTO

use serde::Deserialize;

/// `GET /health` 响应体
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResp {
    pub status: String,
    #[serde(default)]
    pub database: String,
}

/// `GET /` 响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
}
