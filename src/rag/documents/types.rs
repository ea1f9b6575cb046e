//! 文档 API DTO（请求和响应结构体）

use crate::rag::documents::models::{Category, UploadDraft};
use crate::rag::serialization::deserialize_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /documents` 列表项，也是 `POST /documents/upload` 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    #[serde(default = "missing_category")]
    pub category: Category,
    #[serde(default)]
    pub chunk_count: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// 缺失分类与无法识别的分类一样归为 `Other`
fn missing_category() -> Category {
    Category::Other
}

/// `POST /documents/upload` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct UploadRequest {
    pub title: String,
    pub content: String,
    pub category: Category,
}

impl From<&UploadDraft> for UploadRequest {
    fn from(draft: &UploadDraft) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            category: draft.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_unknown_category_are_other() {
        let missing: DocumentRecord = serde_json::from_str(
            r#"{"id":"d1","title":"Notes","chunk_count":2,"created_at":"2024-01-15T10:30:00"}"#,
        )
        .unwrap();
        assert_eq!(missing.category, Category::Other);

        let unknown: DocumentRecord = serde_json::from_str(
            r#"{"id":"d2","title":"Notes","category":"certificate","created_at":"2024-01-15T10:30:00"}"#,
        )
        .unwrap();
        assert_eq!(unknown.category, Category::Other);
        assert_eq!(unknown.chunk_count, 0);

        let known: DocumentRecord = serde_json::from_str(
            r#"{"id":"d3","title":"CV","category":"resume","created_at":"2024-01-15T10:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(known.category, Category::Resume);
    }
}
