//! 文档监听器回调接口

use crate::rag::documents::models::{Document, StatusBanner};
use async_trait::async_trait;

/// 文档监听器回调接口
#[async_trait]
pub trait DocumentListener: Send + Sync {
    /// 文档列表刷新完成（整体替换）
    async fn on_documents_loaded(&self, documents: Vec<Document>);

    /// "知识库是否有文档" 发生变化
    async fn on_documents_present_changed(&self, present: bool);

    /// 状态横幅变化，`None` 表示横幅被清除
    async fn on_status_changed(&self, status: Option<StatusBanner>);
}

/// 默认空实现（无操作）
pub struct EmptyDocumentListener;

#[async_trait]
impl DocumentListener for EmptyDocumentListener {
    async fn on_documents_loaded(&self, _documents: Vec<Document>) {}
    async fn on_documents_present_changed(&self, _present: bool) {}
    async fn on_status_changed(&self, _status: Option<StatusBanner>) {}
}
