use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::path::Path;
use tracing::error;

use crate::config::AppConfig;
use crate::errors::PortalError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{internal_error_response, storage_from};

/// 存储名只由 uuid 与扩展名组成，拒绝任何路径成分
fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FileNotFound,
        "File not found",
    ))
}

pub async fn handle_download(
    request: &HttpRequest,
    stored_name: String,
) -> ActixResult<HttpResponse> {
    if !is_safe_stored_name(&stored_name) {
        return Ok(not_found());
    }

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };

    let db_file = match storage.get_file_by_stored_name(&stored_name).await {
        Ok(Some(f)) => f,
        Ok(None) => return Ok(not_found()),
        Err(e) => {
            error!("File query failed: {}", e);
            return Ok(internal_error_response());
        }
    };

    let file_path = Path::new(&AppConfig::get().upload.dir).join(&db_file.stored_name);
    let buf = match tokio::fs::read(&file_path).await {
        Ok(buf) => buf,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(not_found()),
        Err(e) => {
            error!("{}", PortalError::file_operation(format!("读取文件失败: {e}")));
            return Ok(internal_error_response());
        }
    };

    // 使用数据库中的原始文件名
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, db_file.file_type))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename=\"{}\"",
                db_file.original_name.replace('"', "")
            ),
        ))
        .body(buf))
}
