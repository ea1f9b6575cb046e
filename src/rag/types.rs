//! 通用 HTTP 响应处理
//!
//! 后端是 JSON-over-HTTP，错误时可能返回 `{ "detail": "..." }`。

use crate::rag::error::ApiError;
use serde::Deserialize;
use tracing::{debug, error, info};

/// 后端错误响应体
///
/// `detail` 可能是字符串，也可能是校验错误数组，只保留字符串形式
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// 从响应体中提取 detail 字符串，解析失败或非字符串时返回 None
    pub fn detail_from_slice(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// 拼接接口地址，每个路径段单独百分号编码
///
/// 段内的 `/`、`?`、`#` 会被编码，不会改变请求的路径或查询串；`.` 和 `..` 直接拒绝。
pub fn endpoint_url(api_base_url: &str, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "." | "..")) {
        return Err(ApiError::Validation(format!("Invalid path segment: {:?}", bad)));
    }

    let mut url = reqwest::Url::parse(api_base_url)
        .map_err(|e| ApiError::Validation(format!("Invalid API base URL {}: {}", api_base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Validation(format!("Invalid API base URL {}", api_base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// 发送请求，并把传输层错误转换为 `ApiError`
pub async fn send_request(
    request: reqwest::RequestBuilder,
    operation_name: &str,
) -> Result<reqwest::Response, ApiError> {
    request.send().await.map_err(|e| {
        let err = ApiError::from_reqwest(e);
        error!("[HTTP] {}请求失败: {}", operation_name, err);
        err
    })
}

/// 读取响应 body 并检查状态码，返回原始 bytes
async fn read_checked_body(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<Vec<u8>, ApiError> {
    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(ApiError::from_status(status.as_u16(), &body_bytes));
    }
    info!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    Ok(body_bytes.to_vec())
}

/// 通用 HTTP 响应处理函数：检查状态码并直接反序列化为业务结构体
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<T, ApiError> {
    let body_bytes = read_checked_body(response, operation_name).await?;

    serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name,
            e,
            String::from_utf8_lossy(&body_bytes)
        );
        ApiError::Decode(e.to_string())
    })
}

/// 只关心状态码、不关心响应体的请求（例如 DELETE）
pub async fn handle_empty_response(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<(), ApiError> {
    read_checked_body(response, operation_name).await.map(|_| ())
}

/// 读取纯文本响应（例如静态文档）
pub async fn handle_text_response(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<String, ApiError> {
    let body_bytes = read_checked_body(response, operation_name).await?;
    String::from_utf8(body_bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
