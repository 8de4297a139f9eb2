use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ErrorCode;
use crate::scoring::FieldError;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 错误分类（Unauthorized / Forbidden / NotFound / Conflict / ValidationError / InternalError）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 字段级校验错误
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldErrorDetail>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct FieldErrorDetail {
    pub field: String,
    pub message: String,
}

impl From<&FieldError> for FieldErrorDetail {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field.clone(),
            message: err.to_string(),
        }
    }
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            error: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            error: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            error: code.error_name().map(str::to_string),
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 校验失败，附带全部字段错误
    pub fn validation_failed(errors: &[FieldError]) -> Self {
        let details: Vec<FieldErrorDetail> = errors.iter().map(FieldErrorDetail::from).collect();
        let message = details
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            details: Some(details),
            ..Self::error_empty(ErrorCode::ValidationFailed, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_carries_error_name() {
        let body = serde_json::to_value(ApiResponse::error_empty(
            ErrorCode::EvaluationAlreadyExists,
            "exists",
        ))
        .unwrap();
        assert_eq!(body["error"], "Conflict");
        assert_eq!(body["code"], 2001);
        assert!(body.get("data").is_none());
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_validation_failed_lists_every_field() {
        let errors = vec![
            FieldError::missing("teamId"),
            FieldError::invalid("externalEvaluatorEmail", "Email format is invalid"),
        ];
        let body = serde_json::to_value(ApiResponse::validation_failed(&errors)).unwrap();
        assert_eq!(body["error"], "ValidationError");
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["field"], "teamId");
        assert_eq!(details[1]["field"], "externalEvaluatorEmail");
    }
}
