//! 文档 HTTP API 客户端
//!
//! 负责所有文档相关的 HTTP 请求

use crate::rag::documents::types::{DocumentRecord, UploadRequest};
use crate::rag::error::ApiError;
use crate::rag::types::{
    endpoint_url, handle_empty_response, handle_http_response, handle_text_response,
    send_request,
};
use tracing::{debug, info};
use uuid::Uuid;

/// 文档相关的 HTTP API 客户端
#[derive(Clone)]
pub struct DocumentApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl DocumentApi {
    /// 创建新的文档 API 客户端
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 获取全部文档
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["documents"])?;

        info!("[DocsAPI] 📡 请求文档列表");
        debug!("[DocsAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let request = self
            .client
            .get(url.clone())
            .header("operationID", &operation_id);
        let response = send_request(request, "文档列表").await?;
        let records: Vec<DocumentRecord> = handle_http_response(response, "文档列表").await?;

        info!("[DocsAPI] ✅ 文档列表响应，文档数: {}", records.len());
        debug!(
            "[DocsAPI]   文档ID列表: {:?}",
            records.iter().map(|d| &d.id).collect::<Vec<_>>()
        );
        Ok(records)
    }

    /// 上传文档，后端负责切片和向量化
    pub async fn upload_document(&self, req: &UploadRequest) -> Result<DocumentRecord, ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["documents", "upload"])?;

        info!(
            "[DocsAPI] 📡 上传文档: {} ({}, {} 字符)",
            req.title,
            req.category,
            req.content.chars().count()
        );
        debug!("[DocsAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let request = self
            .client
            .post(url.clone())
            .header("operationID", &operation_id)
            .json(req);
        let response = send_request(request, "上传文档").await?;
        let record: DocumentRecord = handle_http_response(response, "上传文档").await?;

        info!(
            "[DocsAPI] ✅ 上传成功，文档ID: {}, 切片数: {}",
            record.id, record.chunk_count
        );
        Ok(record)
    }

    /// 删除文档（后端同时删除其向量）
    pub async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = endpoint_url(&self.api_base_url, &["documents", id])?;

        info!("[DocsAPI] 📡 删除文档: {}", id);
        debug!("[DocsAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let request = self
            .client
            .delete(url.clone())
            .header("operationID", &operation_id);
        let response = send_request(request, "删除文档").await?;
        handle_empty_response(response, "删除文档").await?;

        info!("[DocsAPI] ✅ 文档已删除: {}", id);
        Ok(())
    }

    /// 拉取静态文本（默认文档）
    pub async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
        info!("[DocsAPI] 📡 拉取默认文档: {}", url);
        let response = send_request(self.client.get(url), "默认文档").await?;
        handle_text_response(response, "默认文档").await
    }
}
