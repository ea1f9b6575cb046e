//! 助手客户端
//!
//! 用同一份配置和同一个 HTTP 客户端组装三个互相独立的组件：
//! 聊天会话、文档知识库、连通性监控。组件之间不共享可变状态，
//! 唯一的跨组件信号是知识库发出的 "是否有文档"。

use crate::rag::chat::{
    AvatarPresenter, ChatListener, ConversationSession, DidPresenter,
};
use crate::rag::config::ClientConfig;
use crate::rag::documents::{DocumentKnowledgeBase, DocumentListener};
use crate::rag::health::{ConnectivityListener, ConnectivityMonitor};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 助手客户端
pub struct AssistantClient {
    config: ClientConfig,
    session: ConversationSession,
    knowledge_base: DocumentKnowledgeBase,
    monitor: ConnectivityMonitor,
}

impl AssistantClient {
    /// 创建新的客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::ClientBuilder::new()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .user_agent(concat!("rag-assistant-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// 使用外部提供的 HTTP 客户端
    pub fn with_http_client(config: ClientConfig, http_client: reqwest::Client) -> Self {
        info!("[Client] 创建助手客户端，API: {}", config.api_base_url);
        Self {
            session: ConversationSession::new(config.clone(), http_client.clone()),
            knowledge_base: DocumentKnowledgeBase::new(config.clone(), http_client.clone()),
            monitor: ConnectivityMonitor::new(&config, http_client),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn knowledge_base(&self) -> &DocumentKnowledgeBase {
        &self.knowledge_base
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// 注册聊天监听器
    pub fn set_chat_listener(&mut self, listener: Arc<dyn ChatListener>) {
        self.session.set_listener(listener);
    }

    /// 注册文档监听器
    pub fn set_document_listener(&mut self, listener: Arc<dyn DocumentListener>) {
        self.knowledge_base.set_listener(listener);
    }

    /// 注册连通性监听器
    pub async fn set_connectivity_listener(&self, listener: Arc<dyn ConnectivityListener>) {
        self.monitor.set_listener(listener).await;
    }

    /// 尝试启用数字人头像，返回是否启用成功
    pub async fn enable_avatar(&mut self) -> bool {
        let presenter = Arc::new(DidPresenter::new(self.config.avatar_api_key.clone()));
        let enabled = presenter.initialize().await;
        if enabled {
            self.session.set_presenter(presenter);
        }
        enabled
    }

    /// 订阅 "知识库是否有文档" 信号
    ///
    /// 目前聊天会话并不消费该信号，由外层容器决定如何使用
    pub fn documents_present(&self) -> watch::Receiver<bool> {
        self.knowledge_base.documents_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        let config = ClientConfig::default().with_api_base_url("localhost:8000");
        assert!(AssistantClient::new(config).is_err());
    }

    #[tokio::test]
    async fn avatar_stays_disabled_without_stream_support() {
        let mut client = AssistantClient::new(ClientConfig::default().with_avatar_api_key("key"))
            .expect("client");
        assert!(!client.enable_avatar().await);
        assert!(!client.session().presenter().is_enabled());
        assert!(!*client.documents_present().borrow());
    }
}
