pub mod chat;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod health;
pub mod sequence;
pub mod serialization;
pub mod types;

// 重新导出常用类型
pub use client::AssistantClient;
pub use config::{ClientConfig, DefaultDocumentConfig, DocumentSource};
pub use error::ApiError;
pub use sequence::RequestSequencer;
