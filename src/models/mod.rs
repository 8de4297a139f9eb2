pub mod common;
pub mod evaluations;
pub mod files;
pub mod proposals;
pub mod teams;
pub mod users;

pub use common::{ApiResponse, FieldErrorDetail};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API 响应中的业务错误码
///
/// `error_name()` 对应 HTTP 层的错误分类，写入响应体的 `error` 字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1005,
    InternalServerError = 1006,

    // 评分相关
    EvaluationNotFound = 2000,
    EvaluationAlreadyExists = 2001,
    EvaluationMembersMismatch = 2002,

    // 文件相关
    FileUploadFailed = 3000,
    FileTypeNotAllowed = 3001,
    FileSizeExceeded = 3002,
    FileNotFound = 3003,
    MultifileUploadNotAllowed = 3004,

    // 项目申报相关
    ProposalNotFound = 4000,
    ProposalInvalid = 4001,
    TeamNotFound = 4002,

    // 导出相关
    ExportFailed = 5000,
    ExportColumnsInvalid = 5001,
}

impl ErrorCode {
    /// 错误分类名称
    pub fn error_name(self) -> Option<&'static str> {
        match self {
            ErrorCode::Success => None,
            ErrorCode::Unauthorized => Some("Unauthorized"),
            ErrorCode::Forbidden => Some("Forbidden"),
            ErrorCode::NotFound
            | ErrorCode::EvaluationNotFound
            | ErrorCode::FileNotFound
            | ErrorCode::ProposalNotFound
            | ErrorCode::TeamNotFound => Some("NotFound"),
            ErrorCode::Conflict | ErrorCode::EvaluationAlreadyExists => Some("Conflict"),
            ErrorCode::BadRequest
            | ErrorCode::ValidationFailed
            | ErrorCode::EvaluationMembersMismatch
            | ErrorCode::FileTypeNotAllowed
            | ErrorCode::FileSizeExceeded
            | ErrorCode::MultifileUploadNotAllowed
            | ErrorCode::ProposalInvalid
            | ErrorCode::ExportColumnsInvalid => Some("ValidationError"),
            ErrorCode::InternalServerError | ErrorCode::FileUploadFailed | ErrorCode::ExportFailed => {
                Some("InternalError")
            }
        }
    }
}
