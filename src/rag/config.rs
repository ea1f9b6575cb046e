//! 客户端配置
//!
//! 所有组件在构造时注入同一份配置，组件内部不读取环境变量。

use crate::rag::documents::models::Category;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_START_HINT: &str = "cd backend && python main.py";

/// 客户端配置
///
/// 可以从 TOML 文件加载，缺失的字段使用默认值：
///
/// ```toml
/// api_base_url = "http://localhost:8000"
/// health_timeout_ms = 5000
///
/// [default_document]
/// title = "Resume"
/// path = "docs/resume.md"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 后端 HTTP API 基础地址
    pub api_base_url: String,
    /// 健康检查超时（毫秒）
    pub health_timeout_ms: u64,
    /// 健康检查轮询间隔（毫秒）
    pub health_poll_interval_ms: u64,
    /// 状态横幅自动清除延迟（毫秒）
    pub status_clear_delay_ms: u64,
    /// 引用片段展示的最大字符数
    pub excerpt_chars: usize,
    /// 后端启动方式，出现在不可达错误的修复提示里
    pub backend_start_hint: String,
    /// 默认文档（用于预填上传草稿）
    pub default_document: Option<DefaultDocumentConfig>,
    /// 会话为空时展示的建议问题
    pub suggested_questions: Vec<String>,
    /// 头像服务 API Key，未配置时头像功能禁用
    pub avatar_api_key: Option<String>,
}

/// 默认文档配置，`path` 与 `url` 二选一，同时存在时优先使用 `path`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DefaultDocumentConfig {
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
}

/// 默认文档来源
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
}

impl DefaultDocumentConfig {
    pub fn from_file(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            category: Category::Resume,
            path: Some(path.into()),
            url: None,
        }
    }

    pub fn from_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: Category::Resume,
            path: None,
            url: Some(url.into()),
        }
    }

    pub fn source(&self) -> Option<DocumentSource> {
        match (&self.path, &self.url) {
            (Some(path), _) => Some(DocumentSource::File(path.clone())),
            (None, Some(url)) => Some(DocumentSource::Url(url.clone())),
            (None, None) => None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            health_timeout_ms: 5_000,
            health_poll_interval_ms: 30_000,
            status_clear_delay_ms: 3_000,
            excerpt_chars: 150,
            backend_start_hint: DEFAULT_START_HINT.to_string(),
            default_document: None,
            suggested_questions: default_suggested_questions(),
            avatar_api_key: None,
        }
    }
}

fn default_suggested_questions() -> Vec<String> {
    [
        "What are the main technical skills?",
        "Tell me about the most recent project",
        "What kind of roles would be a good fit?",
        "What experience is there with healthcare AI?",
        "Are there any patents?",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

impl ClientConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: ClientConfig = toml::from_str(content)?;
        config.api_base_url = normalize_base_url(&config.api_base_url);
        config.validate()?;
        Ok(config)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            anyhow::bail!("api_base_url 必须以 http:// 或 https:// 开头: {}", self.api_base_url);
        }
        if self.health_timeout_ms == 0 || self.health_poll_interval_ms == 0 {
            anyhow::bail!("健康检查超时和轮询间隔必须大于 0");
        }
        if let Some(doc) = &self.default_document {
            if doc.source().is_none() {
                anyhow::bail!("default_document 需要配置 path 或 url");
            }
        }
        Ok(())
    }

    pub fn with_api_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.api_base_url = normalize_base_url(url.as_ref());
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_health_poll_interval(mut self, interval: Duration) -> Self {
        self.health_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_default_document(mut self, doc: DefaultDocumentConfig) -> Self {
        self.default_document = Some(doc);
        self
    }

    pub fn with_avatar_api_key(mut self, key: impl Into<String>) -> Self {
        self.avatar_api_key = Some(key.into());
        self
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_interval_ms)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_delay_ms)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.health_timeout(), Duration::from_secs(5));
        assert_eq!(config.health_poll_interval(), Duration::from_secs(30));
        assert_eq!(config.status_clear_delay(), Duration::from_secs(3));
        assert_eq!(config.excerpt_chars, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            api_base_url = "http://rag.internal:9000/"
            health_poll_interval_ms = 1000

            [default_document]
            title = "Team handbook"
            category = "other"
            url = "http://static.internal/handbook.md"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://rag.internal:9000");
        assert_eq!(config.health_poll_interval(), Duration::from_secs(1));
        assert_eq!(config.health_timeout(), Duration::from_secs(5));

        let doc = config.default_document.unwrap();
        assert_eq!(doc.category, Category::Other);
        assert_eq!(
            doc.source(),
            Some(DocumentSource::Url("http://static.internal/handbook.md".into()))
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_toml_str(r#"api_base_url = "localhost:8000""#).is_err());
        assert!(ClientConfig::from_toml_str("health_timeout_ms = 0").is_err());
        assert!(ClientConfig::from_toml_str(
            r#"
            [default_document]
            title = "nothing to load"
            "#
        )
        .is_err());
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let config = ClientConfig::default().with_api_base_url("http://127.0.0.1:8000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
    }
}
