//! 错误分类
//!
//! 所有网络调用的失败都在调用点被转换为 `ApiError`，再由各组件转换为
//! 会话中的错误消息（聊天）或临时状态横幅（文档 / 连通性）。

use crate::rag::types::ErrorBody;
use thiserror::Error;

/// 客户端错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 本地校验失败（发起网络请求之前）
    #[error("{0}")]
    Validation(String),

    /// 传输层失败：连接被拒绝、DNS 失败、连接中断等，没有拿到任何 HTTP 响应
    #[error("Network Error: {0}")]
    Unreachable(String),

    /// 请求超过了超时上限
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// 404，通常意味着接口地址配置错误
    #[error("Request failed with status code 404")]
    NotFound { detail: Option<String> },

    /// 5xx
    #[error("Request failed with status code {status}")]
    Server { status: u16, detail: Option<String> },

    /// 其他非 2xx 状态码
    #[error("Request failed with status code {status}")]
    Http { status: u16, detail: Option<String> },

    /// 响应体无法解析
    #[error("Invalid response from backend: {0}")]
    Decode(String),

    /// 本地文件读取失败
    #[error("Could not read file: {0}")]
    Io(String),
}

impl ApiError {
    /// 对 reqwest 的传输层错误进行分类
    ///
    /// 没有拿到 HTTP 响应的失败一律视为后端不可达，超时单独区分。
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return ApiError::from_status(status.as_u16(), &[]);
        }
        ApiError::Unreachable(err.to_string())
    }

    /// 根据 HTTP 状态码和响应体分类，响应体中的 `detail` 字段会被保留
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = ErrorBody::detail_from_slice(body);
        match status {
            404 => ApiError::NotFound { detail },
            500..=599 => ApiError::Server { status, detail },
            _ => ApiError::Http { status, detail },
        }
    }

    /// 后端返回的 detail（如果有）
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { detail }
            | ApiError::Server { detail, .. }
            | ApiError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// 是否为传输层失败（不可达或超时）
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Unreachable(_) | ApiError::Timeout(_))
    }

    /// 优先返回后端 detail，否则返回错误本身的描述
    pub fn detail_or_message(&self) -> String {
        match self.detail() {
            Some(detail) => detail.to_string(),
            None => self.to_string(),
        }
    }

    /// 聊天失败时展示给用户的助手消息
    pub fn chat_message(&self, api_base_url: &str, start_hint: &str) -> String {
        match self {
            e if e.is_transport() => format!(
                "🔌 Network Error: Cannot connect to backend. Please ensure:\n\n\
                 1. Backend is running ({})\n\
                 2. Backend is on {}\n\
                 3. Check the client log for details",
                start_hint, api_base_url
            ),
            ApiError::NotFound { .. } => {
                "❌ API endpoint not found. Backend may not be running correctly.".to_string()
            }
            ApiError::Server { detail, .. } => format!(
                "⚠️ Backend server error: {}",
                detail.as_deref().unwrap_or("Unknown error")
            ),
            _ => "Sorry, I encountered an error. Please try again.".to_string(),
        }
    }

    /// 连通性检查失败时的错误描述
    pub fn connectivity_error(&self) -> String {
        if self.is_transport() {
            "Cannot reach backend".to_string()
        } else {
            self.detail_or_message()
        }
    }

    /// 连通性检查失败时的修复建议
    pub fn connectivity_suggestion(&self, start_hint: &str) -> String {
        if self.is_transport() {
            format!("Make sure backend is running: {}", start_hint)
        } else {
            "Check backend logs for errors".to_string()
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ApiError::from_status(404, b""),
            ApiError::NotFound { detail: None }
        );
        assert_eq!(
            ApiError::from_status(503, br#"{"detail":"Service unhealthy: db down"}"#),
            ApiError::Server {
                status: 503,
                detail: Some("Service unhealthy: db down".to_string())
            }
        );
        assert_eq!(
            ApiError::from_status(422, br#"{"detail":[{"loc":["body","title"]}]}"#),
            ApiError::Http {
                status: 422,
                detail: None
            }
        );
    }

    #[test]
    fn chat_message_names_start_procedure_for_transport_failures() {
        let base = "http://localhost:8000";
        let hint = "cd backend && python main.py";

        let unreachable = ApiError::Unreachable("connection refused".into());
        let msg = unreachable.chat_message(base, hint);
        assert!(msg.contains(hint));
        assert!(msg.contains("localhost:8000"));

        let timeout = ApiError::Timeout("5s".into());
        assert!(timeout.chat_message(base, hint).contains(hint));
    }

    #[test]
    fn chat_message_per_class() {
        let base = "http://localhost:8000";
        let hint = "start";

        let not_found = ApiError::NotFound { detail: None }.chat_message(base, hint);
        assert!(not_found.contains("API endpoint not found"));

        let server = ApiError::Server {
            status: 500,
            detail: Some("Error processing chat: boom".into()),
        }
        .chat_message(base, hint);
        assert!(server.contains("Backend server error: Error processing chat: boom"));

        let server_no_detail = ApiError::Server {
            status: 502,
            detail: None,
        }
        .chat_message(base, hint);
        assert!(server_no_detail.ends_with("Unknown error"));

        let other = ApiError::Http {
            status: 400,
            detail: Some("bad".into()),
        }
        .chat_message(base, hint);
        assert_eq!(other, "Sorry, I encountered an error. Please try again.");
    }

    #[test]
    fn detail_or_message_prefers_backend_detail() {
        let e = ApiError::Server {
            status: 500,
            detail: Some("Error uploading document: quota".into()),
        };
        assert_eq!(e.detail_or_message(), "Error uploading document: quota");

        let e = ApiError::Http {
            status: 409,
            detail: None,
        };
        assert_eq!(e.detail_or_message(), "Request failed with status code 409");
    }

    #[test]
    fn connectivity_texts() {
        let e = ApiError::Timeout("deadline".into());
        assert_eq!(e.connectivity_error(), "Cannot reach backend");
        assert!(e.connectivity_suggestion("cd backend && python main.py").contains("python main.py"));

        let e = ApiError::Server {
            status: 503,
            detail: Some("Service unhealthy".into()),
        };
        assert_eq!(e.connectivity_error(), "Service unhealthy");
        assert_eq!(e.connectivity_suggestion("x"), "Check backend logs for errors");
    }
}
