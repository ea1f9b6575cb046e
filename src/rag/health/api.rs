//! 健康检查 HTTP API 客户端

use crate::rag::error::ApiError;
use crate::rag::health::types::{HealthResp, ServiceInfo};
use crate::rag::types::{endpoint_url, handle_http_response, send_request};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// 健康检查 API 客户端
#[derive(Clone)]
pub struct HealthApi {
    client: reqwest::Client,
    api_base_url: String,
    /// 单次探测的超时上限
    timeout: Duration,
}

impl HealthApi {
    pub fn new(client: reqwest::Client, api_base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            api_base_url,
            timeout,
        }
    }

    /// 探测后端存活（整个请求包括读取响应体都受超时约束，超时按传输失败处理）
    pub async fn check(&self) -> Result<HealthResp, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["health"])?;
        debug!("[HealthAPI] 📡 探测 {}，操作ID: {}", url, operation_id);

        let probe = async {
            let request = self
                .client
                .get(url.clone())
                .header("operationID", &operation_id);
            let response = send_request(request, "健康检查").await?;
            handle_http_response::<HealthResp>(response, "健康检查").await
        };

        match tokio::time::timeout(self.timeout, probe).await {
            Ok(result) => result,
            Err(_) => {
                warn!("[HealthAPI] ⏱️ 健康检查超时（{:?}）", self.timeout);
                Err(ApiError::Timeout(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    /// 获取服务信息（`GET /`）
    pub async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &[""])?;
        debug!("[HealthAPI] 📡 请求服务信息 {}，操作ID: {}", url, operation_id);

        let probe = async {
            let request = self
                .client
                .get(url.clone())
                .header("operationID", &operation_id);
            let response = send_request(request, "服务信息").await?;
            handle_http_response::<ServiceInfo>(response, "服务信息").await
        };
        tokio::time::timeout(self.timeout, probe)
            .await
            .map_err(|_| {
                ApiError::Timeout(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}
