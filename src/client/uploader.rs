//! 上传协调器
//!
//! 把本地选中的文件逐个上传到远端存储，换取可持久保存的引用地址。
//! 单个文件的瞬时失败按线性退避重试：第 n 次失败后等待 `n * backoff_unit`。
//! 批量上传严格按顺序执行，任一文件重试耗尽即中止整批。
//! 协调器不保存跨调用状态，失败后用同一列表重跑会从头再传一遍。

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::utils::mime_for_extension;

/// 待上传的本地文件
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let extension = name
            .rfind('.')
            .map(|idx| &name[idx..])
            .unwrap_or_default();
        Self {
            content_type: mime_for_extension(extension).to_string(),
            name,
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// 远端存储返回的文件引用
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub url: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}

/// 单次传输失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// 服务端返回非成功状态，body 为纯文本错误信息
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected upload response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, file: &LocalFile) -> Result<StoredFile, TransferError>;
}

/// 单次尝试的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Stored,
    Failed(TransferError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    /// 本次失败后、下一次尝试前的等待时间
    pub delay: Option<Duration>,
}

/// 一个文件上传成功的回执
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub file_name: String,
    pub stored: StoredFile,
    pub attempts: Vec<AttemptRecord>,
}

impl UploadReceipt {
    pub fn url(&self) -> &str {
        &self.stored.url
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error(
        "Failed to upload {file_name} after {attempts} attempts. {cause}. Please check your internet connection and try again."
    )]
    Exhausted {
        file_name: String,
        attempts: u32,
        cause: TransferError,
        history: Vec<AttemptRecord>,
    },
    #[error("max attempts must be at least 1")]
    NoAttempts,
}

impl UploadError {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            UploadError::Exhausted { file_name, .. } => Some(file_name),
            UploadError::NoAttempts => None,
        }
    }
}

pub struct UploadCoordinator {
    store: Arc<dyn ObjectStore>,
    backoff_unit: Duration,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, backoff_unit: Duration) -> Self {
        Self {
            store,
            backoff_unit,
        }
    }

    /// 使用配置中的退避单位
    pub fn from_config(store: Arc<dyn ObjectStore>) -> Self {
        let unit = Duration::from_millis(AppConfig::get().client.upload_backoff_ms);
        Self::new(store, unit)
    }

    /// 上传单个文件，最多尝试 `max_attempts` 次
    pub async fn upload_one(
        &self,
        file: &LocalFile,
        max_attempts: u32,
    ) -> Result<UploadReceipt, UploadError> {
        if max_attempts == 0 {
            return Err(UploadError::NoAttempts);
        }

        let mut history = Vec::with_capacity(max_attempts as usize);
        let mut attempt = 1;
        loop {
            info!(
                "Uploading {} - attempt {}/{}",
                file.name, attempt, max_attempts
            );
            match self.store.put(file).await {
                Ok(stored) => {
                    info!("Uploaded {} on attempt {}", file.name, attempt);
                    history.push(AttemptRecord {
                        attempt,
                        outcome: AttemptOutcome::Stored,
                        delay: None,
                    });
                    return Ok(UploadReceipt {
                        file_name: file.name.clone(),
                        stored,
                        attempts: history,
                    });
                }
                Err(cause) if attempt >= max_attempts => {
                    warn!(
                        "Giving up on {} after {} attempts: {}",
                        file.name, attempt, cause
                    );
                    history.push(AttemptRecord {
                        attempt,
                        outcome: AttemptOutcome::Failed(cause.clone()),
                        delay: None,
                    });
                    return Err(UploadError::Exhausted {
                        file_name: file.name.clone(),
                        attempts: attempt,
                        cause,
                        history,
                    });
                }
                Err(cause) => {
                    let delay = self.backoff_unit * attempt;
                    warn!(
                        "Upload of {} failed on attempt {}: {}; retrying in {:?}",
                        file.name, attempt, cause, delay
                    );
                    history.push(AttemptRecord {
                        attempt,
                        outcome: AttemptOutcome::Failed(cause),
                        delay: Some(delay),
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// 按顺序上传全部文件，任一文件失败即中止，不再尝试其余文件
    pub async fn upload_many(
        &self,
        files: &[LocalFile],
        max_attempts: u32,
    ) -> Result<Vec<UploadReceipt>, UploadError> {
        let mut receipts = Vec::with_capacity(files.len());
        for file in files {
            receipts.push(self.upload_one(file, max_attempts).await?);
        }
        Ok(receipts)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// 按文件名预设失败次数的内存存储
    #[derive(Default)]
    pub(crate) struct FlakyStore {
        failures: Mutex<HashMap<String, u32>>,
        pub(crate) calls: Mutex<Vec<(String, Instant)>>,
    }

    impl FlakyStore {
        pub(crate) fn failing(name: &str, times: u32) -> Self {
            let store = Self::default();
            store.fail(name, times);
            store
        }

        pub(crate) fn fail(&self, name: &str, times: u32) {
            self.failures
                .lock()
                .unwrap()
                .insert(name.to_string(), times);
        }

        pub(crate) fn call_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn put(&self, file: &LocalFile) -> Result<StoredFile, TransferError> {
            self.calls
                .lock()
                .unwrap()
                .push((file.name.clone(), Instant::now()));
            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(&file.name)
                && *left > 0
            {
                *left -= 1;
                return Err(TransferError::Rejected {
                    status: 500,
                    message: "Upload failed".to_string(),
                });
            }
            Ok(StoredFile {
                url: format!("/uploads/{}", file.name),
                filename: file.name.clone(),
                content_type: file.content_type.clone(),
                size: file.size() as i64,
            })
        }
    }

    fn coordinator(store: Arc<FlakyStore>) -> UploadCoordinator {
        UploadCoordinator::new(store, Duration::from_secs(2))
    }

    #[test]
    fn test_local_file_guesses_content_type() {
        let file = LocalFile::new("Poster.PNG", vec![1, 2, 3]);
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_grow_linearly() {
        let store = Arc::new(FlakyStore::failing("report.pdf", 2));
        let start = Instant::now();

        let receipt = coordinator(store.clone())
            .upload_one(&LocalFile::new("report.pdf", vec![0; 4]), 4)
            .await
            .unwrap();

        assert_eq!(receipt.url(), "/uploads/report.pdf");
        let delays: Vec<_> = receipt.attempts.iter().map(|a| a.delay).collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(4)),
                None
            ]
        );

        let calls = store.calls.lock().unwrap();
        let offsets: Vec<_> = calls.iter().map(|(_, at)| *at - start).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_secs(2),
                Duration::from_secs(6)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_error_carries_last_cause() {
        let store = Arc::new(FlakyStore::failing("video.mp4", 10));
        let err = coordinator(store.clone())
            .upload_one(&LocalFile::new("video.mp4", vec![0; 4]), 3)
            .await
            .unwrap_err();

        match &err {
            UploadError::Exhausted {
                file_name,
                attempts,
                history,
                ..
            } => {
                assert_eq!(file_name, "video.mp4");
                assert_eq!(*attempts, 3);
                assert_eq!(history.len(), 3);
                assert_eq!(history[2].delay, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("video.mp4 after 3 attempts"));
        assert!(message.contains("check your internet connection"));
        assert_eq!(store.call_names().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_stops_at_first_permanent_failure() {
        let store = Arc::new(FlakyStore::failing("b.pdf", 10));
        let files = vec![
            LocalFile::new("a.pdf", vec![1]),
            LocalFile::new("b.pdf", vec![2]),
            LocalFile::new("c.pdf", vec![3]),
        ];

        let err = coordinator(store.clone())
            .upload_many(&files, 2)
            .await
            .unwrap_err();
        assert_eq!(err.file_name(), Some("b.pdf"));
        assert_eq!(store.call_names(), vec!["a.pdf", "b.pdf", "b.pdf"]);

        // 重跑从头开始
        store.fail("b.pdf", 0);
        let receipts = coordinator(store.clone())
            .upload_many(&files, 2)
            .await
            .unwrap();
        let urls: Vec<_> = receipts.iter().map(|r| r.url()).collect();
        assert_eq!(urls, vec!["/uploads/a.pdf", "/uploads/b.pdf", "/uploads/c.pdf"]);
    }

    #[tokio::test]
    async fn test_zero_attempts_is_rejected() {
        let store = Arc::new(FlakyStore::default());
        let err = coordinator(store.clone())
            .upload_one(&LocalFile::new("a.pdf", vec![1]), 0)
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::NoAttempts);
        assert!(store.call_names().is_empty());
    }
}
