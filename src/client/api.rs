//! 门户 HTTP 客户端与申报提交流程
//!
//! 提交顺序：附件预检 → 按类别上传 → 计算最终引用 → 创建或更新申报。
//! 预检或上传失败时不会发出申报请求。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::gate::{ExistingRefs, FileCategory, FileSelection, GateError, SubmissionGate, UploadedRefs};
use super::uploader::{LocalFile, ObjectStore, StoredFile, TransferError, UploadCoordinator, UploadError};
use crate::config::AppConfig;
use crate::models::ApiResponse;
use crate::models::files::FileUploadResponse;
use crate::models::proposals::{Proposal, ProposalRequest};

const UPLOAD_PATH: &str = "/api/v1/files/upload";
const PROPOSALS_PATH: &str = "/api/v1/student/proposals";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("File upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response did not contain data")]
    EmptyResponse,
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PortalClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(token: Option<String>) -> Result<Self, ClientError> {
        let config = &AppConfig::get().client;
        Self::new(
            config.base_url.clone(),
            token,
            Duration::from_secs(config.request_timeout),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_proposal(&self, builder: reqwest::RequestBuilder) -> Result<Proposal, ClientError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        proposal_from_body(status, &body)
    }
}

/// 先看状态码再解析响应体；错误体不一定是 JSON（例如 413 的纯文本）
fn proposal_from_body(status: reqwest::StatusCode, body: &str) -> Result<Proposal, ClientError> {
    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        } else {
            message
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: ApiResponse<Proposal> = serde_json::from_str(body)?;
    parsed.data.ok_or(ClientError::EmptyResponse)
}

#[async_trait]
impl ObjectStore for PortalClient {
    async fn put(&self, file: &LocalFile) -> Result<StoredFile, TransferError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| TransferError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorized(self.http.post(self.url(UPLOAD_PATH)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // 上传接口的错误体为纯文本
            let message = response.text().await.unwrap_or_default();
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: FileUploadResponse = response
            .json()
            .await
            .map_err(|e| TransferError::InvalidResponse(e.to_string()))?;
        Ok(StoredFile {
            url: uploaded.url,
            filename: uploaded.filename,
            content_type: uploaded.content_type,
            size: uploaded.size,
        })
    }
}

/// 申报接口
#[async_trait]
pub trait ProposalApi: Send + Sync {
    async fn create_proposal(&self, request: &ProposalRequest) -> Result<Proposal, ClientError>;
    async fn update_proposal(&self, id: i64, request: &ProposalRequest) -> Result<Proposal, ClientError>;
}

#[async_trait]
impl ProposalApi for PortalClient {
    async fn create_proposal(&self, request: &ProposalRequest) -> Result<Proposal, ClientError> {
        self.send_proposal(self.http.post(self.url(PROPOSALS_PATH)).json(request))
            .await
    }

    async fn update_proposal(&self, id: i64, request: &ProposalRequest) -> Result<Proposal, ClientError> {
        let path = format!("{PROPOSALS_PATH}/{id}");
        self.send_proposal(self.http.put(self.url(&path)).json(request))
            .await
    }
}

/// 表单中的申报草稿
#[derive(Debug, Clone, Default)]
pub struct ProposalDraft {
    /// 编辑已有申报时为其 ID
    pub proposal_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub link: Option<String>,
    pub selection: FileSelection,
    pub existing: ExistingRefs,
}

impl ProposalDraft {
    /// 以已保存的申报初始化，已有附件作为保留引用
    pub fn from_proposal(proposal: &Proposal) -> Self {
        Self {
            proposal_id: Some(proposal.id),
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            content: proposal.content.clone(),
            link: proposal.link.clone(),
            selection: FileSelection::new(),
            existing: ExistingRefs::from([
                (FileCategory::Report, proposal.attachment.clone()),
                (FileCategory::Poster, proposal.poster_attachment.clone()),
                (FileCategory::Ppt, proposal.ppt_attachment.clone()),
            ]),
        }
    }
}

pub struct ProposalSubmitter {
    api: Arc<dyn ProposalApi>,
    coordinator: UploadCoordinator,
    gate: SubmissionGate,
    max_attempts: u32,
}

impl ProposalSubmitter {
    pub fn new(api: Arc<dyn ProposalApi>, coordinator: UploadCoordinator, max_attempts: u32) -> Self {
        Self {
            api,
            coordinator,
            gate: SubmissionGate::proposal(),
            max_attempts,
        }
    }

    /// 同一个客户端既负责上传也负责申报接口
    pub fn for_client(client: Arc<PortalClient>) -> Self {
        let max_attempts = AppConfig::get().client.upload_max_attempts;
        let coordinator = UploadCoordinator::from_config(client.clone());
        Self::new(client, coordinator, max_attempts)
    }

    pub async fn submit(&self, draft: &ProposalDraft) -> Result<Proposal, ClientError> {
        self.gate.precheck(&draft.selection, &draft.existing)?;

        let mut uploaded = UploadedRefs::new();
        for category in FileCategory::ALL {
            let Some(files) = draft.selection.get(&category).filter(|f| !f.is_empty()) else {
                continue;
            };
            info!("Uploading {} {} file(s)", files.len(), category);
            let receipts = self.coordinator.upload_many(files, self.max_attempts).await?;
            uploaded.insert(
                category,
                receipts.iter().map(|r| r.url().to_string()).collect(),
            );
        }

        let mut resolved = self.gate.resolve(&uploaded, &draft.existing)?;
        let mut take = |category| resolved.remove(&category).unwrap_or_default();
        let request = ProposalRequest {
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            attachment: take(FileCategory::Report),
            poster_attachment: take(FileCategory::Poster),
            ppt_attachment: take(FileCategory::Ppt),
            link: draft.link.clone(),
        };
        debug!("Resolved proposal attachments: {:?}", request);

        match draft.proposal_id {
            Some(id) => self.api.update_proposal(id, &request).await,
            None => self.api.create_proposal(&request).await,
        }
    }
}
