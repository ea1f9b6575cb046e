//! 删除确认
//!
//! 删除前必须经过一次明确的人工确认，确认提示中要包含文档标题。

use async_trait::async_trait;

#[async_trait]
pub trait DeleteConfirmation: Send + Sync {
    /// 返回 `true` 表示用户确认删除
    async fn confirm(&self, prompt: &str) -> bool;
}

/// 固定应答（用于 `--yes` 之类的非交互场景和测试）
pub struct FixedAnswer(pub bool);

#[async_trait]
impl DeleteConfirmation for FixedAnswer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// 删除确认提示语
pub fn delete_prompt(title: &str) -> String {
    format!("Are you sure you want to delete \"{}\"?", title)
}
