use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 上传成功后的文件引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub struct FileUploadResponse {
    /// 可持久保存的访问地址
    pub url: String,
    /// 原始文件名
    pub filename: String,
    /// MIME 类型
    #[serde(rename = "type")]
    pub content_type: String,
    /// 文件大小(字节)
    pub size: i64,
}
