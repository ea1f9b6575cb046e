//! 聊天 HTTP API 客户端
//!
//! 负责所有聊天相关的 HTTP 请求

use crate::rag::chat::types::{ChatRequest, ChatResponse, ConversationHistoryResp};
use crate::rag::error::ApiError;
use crate::rag::types::{endpoint_url, handle_http_response, send_request};
use tracing::{debug, info};
use uuid::Uuid;

/// 聊天相关的 HTTP API 客户端
#[derive(Clone)]
pub struct ChatApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl ChatApi {
    /// 创建新的聊天 API 客户端
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 发送一条用户消息，`conversation_id` 为 None 时由后端新建会话
    pub async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatResponse, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["chat"])?;

        info!("[ChatAPI] 📡 发送聊天消息");
        debug!(
            "[ChatAPI]   请求URL: {}, 会话ID: {:?}, 操作ID: {}",
            url, conversation_id, operation_id
        );

        let request = self
            .client
            .post(url.clone())
            .header("operationID", &operation_id)
            .json(&ChatRequest {
                message: message.to_string(),
                conversation_id: conversation_id.map(str::to_string),
            });
        let response = send_request(request, "聊天").await?;
        let resp: ChatResponse = handle_http_response(response, "聊天").await?;

        info!(
            "[ChatAPI] ✅ 收到回复，会话ID: {}, 来源数: {}",
            resp.conversation_id,
            resp.sources.len()
        );
        Ok(resp)
    }

    /// 获取会话历史
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationHistoryResp, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["conversations", conversation_id])?;

        info!("[ChatAPI] 📡 请求会话历史: {}", conversation_id);
        debug!("[ChatAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let request = self
            .client
            .get(url.clone())
            .header("operationID", &operation_id);
        let response = send_request(request, "会话历史").await?;
        let resp: ConversationHistoryResp = handle_http_response(response, "会话历史").await?;

        info!("[ChatAPI] ✅ 会话历史消息数: {}", resp.messages.len());
        Ok(resp)
    }
}
