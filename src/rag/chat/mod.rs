//! 聊天模块
//!
//! 管理单个会话线程：提交用户消息、跟踪后端分配的会话 ID、
//! 渲染带引用来源或错误分类的助手回复

pub mod api;
pub mod listener;
pub mod models;
pub mod presenter;
pub mod render;
pub mod service;
pub mod types;

// 重新导出主要类型和函数
pub use api::ChatApi;
pub use listener::{ChatListener, EmptyChatListener};
pub use models::{ConversationTurn, Role, SessionSnapshot, SourceCitation, SubmitOutcome};
pub use presenter::{AvatarPresenter, DidPresenter, NoopPresenter};
pub use service::ConversationSession;
pub use types::{ChatRequest, ChatResponse, ConversationHistoryResp};
