//! 聊天 API DTO（请求和响应结构体）

use crate::rag::chat::models::Role;
use crate::rag::serialization::deserialize_vec_or_null;
use serde::{Deserialize, Serialize};

/// `POST /chat` 请求体，`conversation_id` 未设置时序列化为 null
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

/// `POST /chat` 响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub sources: Vec<SourceRecord>,
}

/// 检索命中的文档片段
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub text: String,
}

/// `GET /conversations/{id}` 响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationHistoryResp {
    pub conversation_id: String,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub messages: Vec<HistoryMessage>,
}

/// 历史消息
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
