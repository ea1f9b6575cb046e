//! 文档知识库模块
//!
//! 上传草稿与校验、上传、列表、删除，以及临时状态横幅

pub mod api;
pub mod confirm;
pub mod listener;
pub mod models;
pub mod service;
pub mod types;

// 重新导出主要类型和函数
pub use api::DocumentApi;
pub use confirm::{delete_prompt, DeleteConfirmation, FixedAnswer};
pub use listener::{DocumentListener, EmptyDocumentListener};
pub use models::{
    Category, DeleteOutcome, Document, KnowledgeBaseSnapshot, StatusBanner, StatusKind,
    UploadDraft,
};
pub use service::DocumentKnowledgeBase;
pub use types::{DocumentRecord, UploadRequest};
