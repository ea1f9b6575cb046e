pub mod rag;

// 重新导出常用类型和函数，方便外部使用
pub use rag::{
    chat::{ConversationSession, ConversationTurn, Role, SourceCitation, SubmitOutcome},
    client::AssistantClient,
    config::ClientConfig,
    documents::{Category, DeleteOutcome, Document, DocumentKnowledgeBase, UploadDraft},
    error::ApiError,
    health::{ConnectivityMonitor, ConnectivityStatus},
};
