//! 聊天监听器回调接口

use crate::rag::chat::models::ConversationTurn;
use async_trait::async_trait;

/// 聊天监听器回调接口
#[async_trait]
pub trait ChatListener: Send + Sync {
    /// 会话追加了一条消息（用户消息在请求发出前立即回调）
    async fn on_turn_appended(&self, turn: ConversationTurn);

    /// 在途状态变更，`true` 时界面应展示 "Thinking..." 占位
    async fn on_busy_changed(&self, busy: bool);

    /// 后端下发了新的会话 ID
    async fn on_thread_changed(&self, thread_id: String);
}

/// 空实现（默认监听器）
pub struct EmptyChatListener;

#[async_trait]
impl ChatListener for EmptyChatListener {
    async fn on_turn_appended(&self, _turn: ConversationTurn) {}
    async fn on_busy_changed(&self, _busy: bool) {}
    async fn on_thread_changed(&self, _thread_id: String) {}
}
