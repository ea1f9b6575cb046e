//! 连通性状态模型

use std::fmt;

/// 连通性三态
///
/// 没有真正的终态：`Connected` 和 `Error` 都会在下一次检查时回到 `Checking`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    #[default]
    Checking,
    Connected(ConnectedDetail),
    Error(ErrorDetail),
}

/// 连接成功时的详情
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedDetail {
    pub api_url: String,
    pub backend_status: String,
    pub database: String,
}

/// 连接失败时的详情
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub api_url: String,
    pub error: String,
    /// 修复建议
    pub suggestion: String,
}

impl ConnectivityStatus {
    pub fn is_checking(&self) -> bool {
        matches!(self, ConnectivityStatus::Checking)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityStatus::Connected(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConnectivityStatus::Error(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityStatus::Checking => "⏳ Checking connection...",
            ConnectivityStatus::Connected(_) => "✅ Backend Connected",
            ConnectivityStatus::Error(_) => "❌ Backend Offline",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        match self {
            ConnectivityStatus::Checking => Ok(()),
            ConnectivityStatus::Connected(d) => write!(
                f,
                "\n  API: {}\n  Status: {}\n  Database: {}",
                d.api_url, d.backend_status, d.database
            ),
            ConnectivityStatus::Error(d) => write!(
                f,
                "\n  API URL: {}\n  Error: {}\n  Fix: {}",
                d.api_url, d.error, d.suggestion
            ),
        }
    }
}
