//! 连通性监控模块
//!
//! 周期性探测后端健康状态，输出三态状态（checking / connected / error）及修复提示

pub mod api;
pub mod listener;
pub mod models;
pub mod service;
pub mod types;

// 重新导出主要类型和函数
pub use api::HealthApi;
pub use listener::{ConnectivityListener, EmptyConnectivityListener};
pub use models::{ConnectedDetail, ConnectivityStatus, ErrorDetail};
pub use service::ConnectivityMonitor;
pub use types::{HealthResp, ServiceInfo};
