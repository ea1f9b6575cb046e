//! 文档知识库服务层
//!
//! 文档列表总是整体替换为最近一次（按发出顺序）完成的列表请求结果；
//! 上传只有在后端确认创建后才会出现在列表中；删除前必须经过人工确认。

use crate::rag::config::{ClientConfig, DocumentSource};
use crate::rag::documents::api::DocumentApi;
use crate::rag::documents::confirm::{delete_prompt, DeleteConfirmation};
use crate::rag::documents::listener::{DocumentListener, EmptyDocumentListener};
use crate::rag::documents::models::{
    Category, DeleteOutcome, Document, KnowledgeBaseSnapshot, StatusBanner, UploadDraft,
};
use crate::rag::documents::types::UploadRequest;
use crate::rag::error::ApiError;
use crate::rag::sequence::RequestSequencer;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// 本地可导入的文件类型
const IMPORTABLE_EXTENSIONS: [&str; 3] = ["txt", "md", "json"];

#[derive(Default)]
struct KbState {
    documents: Vec<Document>,
    draft: UploadDraft,
    status: Option<StatusBanner>,
    /// 每次设置横幅递增，自动清除只清除自己对应的那一次
    status_generation: u64,
    listing: bool,
    uploading: bool,
}

/// 文档知识库
pub struct DocumentKnowledgeBase {
    config: ClientConfig,
    /// 文档 API 客户端
    api: DocumentApi,
    state: Arc<Mutex<KbState>>,
    /// 列表请求序号
    list_sequencer: RequestSequencer,
    /// 文档监听器
    listener: Arc<dyn DocumentListener>,
    /// "知识库是否有文档" 信号
    present_tx: watch::Sender<bool>,
}

impl DocumentKnowledgeBase {
    /// 创建新的知识库（使用默认空监听器）
    pub fn new(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Self::with_listener(config, http_client, Arc::new(EmptyDocumentListener))
    }

    /// 创建新的知识库（带自定义监听器）
    pub fn with_listener(
        config: ClientConfig,
        http_client: reqwest::Client,
        listener: Arc<dyn DocumentListener>,
    ) -> Self {
        info!("[Docs] 创建文档知识库，API: {}", config.api_base_url);
        let api = DocumentApi::new(http_client, config.api_base_url.clone());
        let (present_tx, _) = watch::channel(false);
        Self {
            config,
            api,
            state: Arc::new(Mutex::new(KbState::default())),
            list_sequencer: RequestSequencer::new(),
            listener,
            present_tx,
        }
    }

    /// 注册文档监听器
    pub fn set_listener(&mut self, listener: Arc<dyn DocumentListener>) {
        self.listener = listener;
    }

    /// 订阅 "知识库是否有文档" 信号
    pub fn documents_present(&self) -> watch::Receiver<bool> {
        self.present_tx.subscribe()
    }

    /// 刷新文档列表
    ///
    /// 成功时整体替换本地列表；失败时保留原列表并展示错误横幅。
    /// 如果在等待期间又发出了新的列表请求，本次结果被丢弃。
    pub async fn list(&self) -> Result<Vec<Document>, ApiError> {
        let seq = self.list_sequencer.issue();
        self.state.lock().await.listing = true;
        debug!("[Docs] 🔄 刷新文档列表 #{}", seq);

        let result = self.api.list_documents().await;

        let mut state = self.state.lock().await;
        if !self.list_sequencer.is_latest(seq) {
            warn!(
                "[Docs] 列表响应 #{} 已过期（最新 #{}），丢弃",
                seq,
                self.list_sequencer.latest()
            );
            return Ok(state.documents.clone());
        }
        state.listing = false;

        match result {
            Ok(records) => {
                let documents: Vec<Document> = records.into_iter().map(Document::from).collect();
                state.documents = documents.clone();
                drop(state);

                let present = !documents.is_empty();
                let changed = self.present_tx.send_if_modified(|current| {
                    let modified = *current != present;
                    *current = present;
                    modified
                });
                info!("[Docs] ✅ 文档列表已刷新，文档数: {}", documents.len());

                self.listener.on_documents_loaded(documents.clone()).await;
                if changed {
                    self.listener.on_documents_present_changed(present).await;
                }
                Ok(documents)
            }
            Err(e) => {
                drop(state);
                error!("[Docs] ❌ 加载文档列表失败: {}", e);
                self.set_status(StatusBanner::error("Failed to load documents"))
                    .await;
                Err(e)
            }
        }
    }

    /// 上传当前草稿
    ///
    /// 标题或内容为空时不发请求；成功后重置草稿并刷新一次列表
    pub async fn upload(&self) -> Result<Document, ApiError> {
        let request = {
            let mut state = self.state.lock().await;
            if state.uploading {
                return Err(ApiError::Validation(
                    "An upload is already in progress".into(),
                ));
            }
            if !state.draft.is_complete() {
                None
            } else {
                state.uploading = true;
                Some(UploadRequest::from(&state.draft))
            }
        };

        let Some(request) = request else {
            info!("[Docs] 草稿不完整，拒绝上传");
            self.set_status(StatusBanner::error("Please fill in all fields"))
                .await;
            return Err(ApiError::Validation("Please fill in all fields".into()));
        };

        self.set_status(StatusBanner::loading("Uploading and embedding document..."))
            .await;

        let result = self.api.upload_document(&request).await;

        {
            let mut state = self.state.lock().await;
            state.uploading = false;
            if result.is_ok() {
                state.draft = UploadDraft::default();
            }
        }

        match result {
            Ok(record) => {
                let document = Document::from(record);
                info!(
                    "[Docs] ✅ 上传成功: {} ({} 个切片)",
                    document.title, document.chunk_count
                );
                self.set_status(StatusBanner::success(
                    "Document uploaded and embedded successfully!",
                ))
                .await;
                if let Err(e) = self.list().await {
                    warn!("[Docs] 上传后刷新列表失败: {}", e);
                }
                Ok(document)
            }
            Err(e) => {
                error!("[Docs] ❌ 上传失败: {}", e);
                self.set_status(StatusBanner::error(format!(
                    "Upload failed: {}",
                    e.detail_or_message()
                )))
                .await;
                Err(e)
            }
        }
    }

    /// 删除文档
    ///
    /// 先请求确认，用户拒绝时不发请求、不改状态
    pub async fn delete(
        &self,
        id: &str,
        title: &str,
        confirmation: &dyn DeleteConfirmation,
    ) -> Result<DeleteOutcome, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::Validation("Document id is required".into()));
        }
        if matches!(id, "." | "..") {
            return Err(ApiError::Validation(format!("Invalid document id: {}", id)));
        }

        if !confirmation.confirm(&delete_prompt(title)).await {
            info!("[Docs] 用户取消删除: {}", title);
            return Ok(DeleteOutcome::Declined);
        }

        match self.api.delete_document(id).await {
            Ok(()) => {
                info!("[Docs] 🗑️ 已删除文档: {} ({})", title, id);
                self.set_status(StatusBanner::success("Document deleted successfully"))
                    .await;
                if let Err(e) = self.list().await {
                    warn!("[Docs] 删除后刷新列表失败: {}", e);
                }
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!("[Docs] ❌ 删除失败: {}", e);
                self.set_status(StatusBanner::error(format!(
                    "Delete failed: {}",
                    e.detail_or_message()
                )))
                .await;
                Err(e)
            }
        }
    }

    /// 导入本地文件到草稿
    ///
    /// 内容写入 `content`；标题为空时用去掉扩展名的文件名作为标题。不发网络请求。
    pub async fn import_file(&self, path: &Path) -> Result<(), ApiError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !IMPORTABLE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::Validation(format!(
                "Unsupported file type: {} (expected .txt, .md or .json)",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let derived_title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut state = self.state.lock().await;
        if state.uploading {
            return Err(ApiError::Validation(
                "An upload is already in progress".into(),
            ));
        }
        if state.draft.title.trim().is_empty() {
            state.draft.title = derived_title;
        }
        state.draft.content = content;
        info!(
            "[Docs] 📄 导入文件 {}，{} 字符",
            path.display(),
            state.draft.content.chars().count()
        );
        Ok(())
    }

    /// 用配置的默认文档预填草稿，不会创建文档
    pub async fn load_default(&self) -> Result<(), ApiError> {
        let Some(default_doc) = self.config.default_document.clone() else {
            self.set_status(StatusBanner::error("No default document is configured"))
                .await;
            return Err(ApiError::Validation(
                "No default document is configured".into(),
            ));
        };

        let content = match default_doc.source() {
            Some(DocumentSource::File(path)) => tokio::fs::read_to_string(&path)
                .await
                .map_err(ApiError::from),
            Some(DocumentSource::Url(url)) => self.api.fetch_text(&url).await,
            None => Err(ApiError::Validation(
                "Default document has no path or url".into(),
            )),
        };

        match content {
            Ok(content) => {
                {
                    let mut state = self.state.lock().await;
                    state.draft = UploadDraft::new(
                        default_doc.title.clone(),
                        content,
                        default_doc.category,
                    );
                }
                info!("[Docs] 📄 已载入默认文档: {}", default_doc.title);
                self.set_status(StatusBanner::success(
                    "Default document loaded. Upload it to add it to the knowledge base.",
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                error!("[Docs] ❌ 载入默认文档失败: {}", e);
                self.set_status(StatusBanner::error(
                    "Could not load default document. Please paste content manually.",
                ))
                .await;
                Err(e)
            }
        }
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.state.lock().await.draft.title = title.into();
    }

    pub async fn set_content(&self, content: impl Into<String>) {
        self.state.lock().await.draft.content = content.into();
    }

    pub async fn set_category(&self, category: Category) {
        self.state.lock().await.draft.category = category;
    }

    pub async fn set_draft(&self, draft: UploadDraft) {
        self.state.lock().await.draft = draft;
    }

    pub async fn draft(&self) -> UploadDraft {
        self.state.lock().await.draft.clone()
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.state.lock().await.documents.clone()
    }

    pub async fn status(&self) -> Option<StatusBanner> {
        self.state.lock().await.status.clone()
    }

    /// 当前状态快照
    pub async fn snapshot(&self) -> KnowledgeBaseSnapshot {
        let state = self.state.lock().await;
        KnowledgeBaseSnapshot {
            documents: state.documents.clone(),
            draft: state.draft.clone(),
            status: state.status.clone(),
            listing: state.listing,
            uploading: state.uploading,
        }
    }

    /// 设置状态横幅；终态横幅在延迟后自动清除
    async fn set_status(&self, banner: StatusBanner) {
        let generation = {
            let mut state = self.state.lock().await;
            state.status = Some(banner.clone());
            state.status_generation += 1;
            state.status_generation
        };
        debug!("[Docs] 状态横幅: {:?}", banner);
        let terminal = banner.is_terminal();
        self.listener.on_status_changed(Some(banner)).await;

        if terminal {
            let state = self.state.clone();
            let listener = self.listener.clone();
            let delay = self.config.status_clear_delay();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let cleared = {
                    let mut state = state.lock().await;
                    if state.status_generation == generation {
                        state.status = None;
                        true
                    } else {
                        false
                    }
                };
                if cleared {
                    debug!("[Docs] 状态横幅已自动清除");
                    listener.on_status_changed(None).await;
                }
            });
        }
    }
}
