//! 连通性监听器回调接口

use crate::rag::health::models::ConnectivityStatus;
use async_trait::async_trait;

#[async_trait]
pub trait ConnectivityListener: Send + Sync {
    /// 状态变化（每次检查开始时先回调一次 `Checking`）
    async fn on_status_changed(&self, status: ConnectivityStatus);
}

/// 空实现（默认监听器）
pub struct EmptyConnectivityListener;

#[async_trait]
impl ConnectivityListener for EmptyConnectivityListener {
    async fn on_status_changed(&self, _status: ConnectivityStatus) {}
}
