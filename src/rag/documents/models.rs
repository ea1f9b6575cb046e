//! 文档本地模型定义

use crate::rag::documents::types::DocumentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 文档分类
///
/// 后端把分类当作普通字符串存储，无法识别的值归为 `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    #[default]
    Resume,
    Project,
    Skill,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Resume,
        Category::Project,
        Category::Skill,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Resume => "resume",
            Category::Project => "project",
            Category::Skill => "skill",
            Category::Other => "other",
        }
    }

    /// 界面上展示的名称
    pub fn label(&self) -> &'static str {
        match self {
            Category::Resume => "Resume",
            Category::Project => "Project Documentation",
            Category::Skill => "Skills & Certifications",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Category::Other)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(Category::Resume),
            "project" => Ok(Category::Project),
            "skill" => Ok(Category::Skill),
            "other" => Ok(Category::Other),
            other => Err(format!(
                "未知的文档分类 {:?}，可选值: resume, project, skill, other",
                other
            )),
        }
    }
}

/// 知识库中的文档（由后端创建，客户端从不分配 ID）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub chunk_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            category: record.category,
            chunk_count: record.chunk_count,
            created_at: record.created_at,
        }
    }
}

/// 上传草稿，上传成功后重置为默认值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    pub title: String,
    pub content: String,
    pub category: Category,
}

impl UploadDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
        }
    }

    /// 标题和内容去掉首尾空白后都不能为空
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// 状态横幅类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

/// 临时状态横幅
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusBanner {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    /// 成功和失败是终态，会在固定延迟后自动清除
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StatusKind::Success | StatusKind::Error)
    }
}

/// 知识库状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBaseSnapshot {
    pub documents: Vec<Document>,
    pub draft: UploadDraft,
    pub status: Option<StatusBanner>,
    /// 列表请求在途
    pub listing: bool,
    /// 上传请求在途
    pub uploading: bool,
}

/// 删除操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 用户取消，未发出任何请求
    Declined,
    Deleted,
}
