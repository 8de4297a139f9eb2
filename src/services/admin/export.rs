//! 评分导出（CSV，每个成员一行）

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use chrono::Utc;
use tracing::{error, info};

use crate::errors::PortalError;
use crate::models::evaluations::responses::EvaluationExportRow;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user, internal_error_response, require_role, storage_from};

/// 序列化为 CSV（带表头）
pub(crate) fn rows_to_csv(rows: &[EvaluationExportRow]) -> Result<Vec<u8>, PortalError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PortalError::serialization(format!("写入 CSV 失败: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| PortalError::serialization(format!("生成 CSV 失败: {e}")))
}

pub async fn export_evaluations(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Admin) {
        return Ok(resp);
    }
    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };

    let rows = match storage.list_evaluation_export_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to load evaluations for export: {}", e);
            return Ok(internal_error_response());
        }
    };

    let body = match rows_to_csv(&rows) {
        Ok(body) => body,
        Err(e) => {
            error!("{}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ExportFailed,
                "Failed to generate export",
            )));
        }
    };

    info!("Admin {} exported {} evaluation rows", user.id, rows.len());

    let filename = format!("evaluations_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body))
}
