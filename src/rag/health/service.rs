//! 连通性监控服务层
//!
//! `start()` 启动轮询任务（立即检查一次，之后按固定间隔检查），
//! `check_now()` 为手动重试，`stop()` 或监控器被释放时轮询任务随之终止。

use crate::rag::config::ClientConfig;
use crate::rag::health::api::HealthApi;
use crate::rag::health::listener::{ConnectivityListener, EmptyConnectivityListener};
use crate::rag::health::models::{ConnectedDetail, ConnectivityStatus, ErrorDetail};
use crate::rag::health::types::ServiceInfo;
use crate::rag::error::ApiError;
use crate::rag::sequence::RequestSequencer;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

struct MonitorInner {
    api_base_url: String,
    start_hint: String,
    api: HealthApi,
    /// 健康检查序号
    sequencer: RequestSequencer,
    status_tx: watch::Sender<ConnectivityStatus>,
    listener: Mutex<Arc<dyn ConnectivityListener>>,
}

impl MonitorInner {
    async fn check(&self) -> ConnectivityStatus {
        let seq = self.sequencer.issue();
        self.publish(ConnectivityStatus::Checking).await;

        let result = self.api.check().await;

        if !self.sequencer.is_latest(seq) {
            debug!("[Health] 检查 #{} 已过期，丢弃", seq);
            return self.status_tx.borrow().clone();
        }

        let status = match result {
            Ok(health) => {
                debug!(
                    "[Health] ✅ 后端在线 status={}, database={}",
                    health.status, health.database
                );
                ConnectivityStatus::Connected(ConnectedDetail {
                    api_url: self.api_base_url.clone(),
                    backend_status: health.status,
                    database: health.database,
                })
            }
            Err(e) => {
                warn!("[Health] ❌ 后端不可用: {}", e);
                ConnectivityStatus::Error(ErrorDetail {
                    api_url: self.api_base_url.clone(),
                    error: e.connectivity_error(),
                    suggestion: e.connectivity_suggestion(&self.start_hint),
                })
            }
        };
        self.publish(status.clone()).await;
        status
    }

    async fn publish(&self, status: ConnectivityStatus) {
        self.status_tx.send_replace(status.clone());
        let listener = self.listener.lock().await.clone();
        listener.on_status_changed(status).await;
    }
}

/// 连通性监控器
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
    poll_interval: std::time::Duration,
    /// 轮询任务句柄
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// 创建新的监控器（使用默认空监听器）
    pub fn new(config: &ClientConfig, http_client: reqwest::Client) -> Self {
        Self::with_listener(config, http_client, Arc::new(EmptyConnectivityListener))
    }

    /// 创建新的监控器（带自定义监听器）
    pub fn with_listener(
        config: &ClientConfig,
        http_client: reqwest::Client,
        listener: Arc<dyn ConnectivityListener>,
    ) -> Self {
        let api = HealthApi::new(
            http_client,
            config.api_base_url.clone(),
            config.health_timeout(),
        );
        let (status_tx, _) = watch::channel(ConnectivityStatus::Checking);
        Self {
            inner: Arc::new(MonitorInner {
                api_base_url: config.api_base_url.clone(),
                start_hint: config.backend_start_hint.clone(),
                api,
                sequencer: RequestSequencer::new(),
                status_tx,
                listener: Mutex::new(listener),
            }),
            poll_interval: config.health_poll_interval(),
            task: Mutex::new(None),
        }
    }

    /// 注册连通性监听器
    pub async fn set_listener(&self, listener: Arc<dyn ConnectivityListener>) {
        *self.inner.listener.lock().await = listener;
    }

    /// 启动轮询任务（重复调用无效）
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("[Health] 轮询任务已在运行");
            return;
        }

        info!(
            "[Health] 🩺 启动连通性轮询，间隔 {:?}",
            self.poll_interval
        );
        let inner = self.inner.clone();
        let period = self.poll_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // 第一次 tick 立即返回
                ticker.tick().await;
                inner.check().await;
            }
        }));
    }

    /// 停止轮询任务
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            info!("[Health] 🛑 连通性轮询已停止");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// 手动重试：立即检查一次，不等待轮询间隔
    pub async fn check_now(&self) -> ConnectivityStatus {
        info!("[Health] 🔁 手动重试连接");
        self.inner.check().await
    }

    /// 当前状态
    pub fn status(&self) -> ConnectivityStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityStatus> {
        self.inner.status_tx.subscribe()
    }

    /// 获取后端服务信息
    pub async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        self.inner.api.service_info().await
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
