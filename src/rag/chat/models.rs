//! 聊天本地模型定义

use crate::rag::chat::types::{HistoryMessage, SourceRecord};
use serde::{Deserialize, Serialize};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 回复引用的来源片段，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    /// 相似度，范围 [0, 1]
    pub similarity: f64,
    pub excerpt: String,
}

impl From<SourceRecord> for SourceCitation {
    fn from(record: SourceRecord) -> Self {
        let similarity = if record.similarity.is_finite() {
            record.similarity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            title: record.title,
            similarity,
            excerpt: record.text,
        }
    }
}

/// 会话中的一轮消息（只追加，不修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceCitation>,
    #[serde(default)]
    pub error: bool,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            error: false,
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<SourceCitation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            error: false,
        }
    }

    /// 失败时追加的助手消息
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources: Vec::new(),
            error: true,
        }
    }
}

impl From<HistoryMessage> for ConversationTurn {
    fn from(msg: HistoryMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
            sources: Vec::new(),
            error: false,
        }
    }
}

/// 会话状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// 后端分配的会话 ID，首次回复前为 None
    pub thread_id: Option<String>,
    pub turns: Vec<ConversationTurn>,
    /// 是否有请求在途
    pub busy: bool,
}

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 输入为空或已有请求在途，未发出请求，状态未变
    Ignored,
    /// 后端正常回复
    Replied(ConversationTurn),
    /// 请求失败，已追加错误消息
    Failed(ConversationTurn),
    /// 回复到达时已有更新的请求发出，结果被丢弃
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_similarity_is_clamped() {
        let record = SourceRecord {
            title: "Resume".into(),
            similarity: 1.3,
            text: "chunk".into(),
        };
        assert_eq!(SourceCitation::from(record).similarity, 1.0);

        let record = SourceRecord {
            title: "Resume".into(),
            similarity: f64::NAN,
            text: "chunk".into(),
        };
        assert_eq!(SourceCitation::from(record).similarity, 0.0);
    }

    #[test]
    fn turn_serialization_matches_wire_shape() {
        let turn = ConversationTurn::assistant_error("boom");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "role": "assistant", "content": "boom", "error": true })
        );
    }
}
