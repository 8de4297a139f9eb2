use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::PortalError;
use crate::middlewares::{RequireJWT, create_plain_error_response};
use crate::models::files::FileUploadResponse;
use crate::services::access::storage_from;
use crate::utils::{mime_for_extension, validate_magic_bytes};

fn bad_request(message: &str) -> HttpResponse {
    create_plain_error_response(StatusCode::BAD_REQUEST, message)
}

fn storage_fault(err: PortalError) -> HttpResponse {
    error!("{}", err);
    create_plain_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store file")
}

/// 小写扩展名（带点），无扩展名时为空串
pub(crate) fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

pub async fn handle_upload(req: &HttpRequest, mut payload: Multipart) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(req) else {
        return Ok(create_plain_error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
        ));
    };

    let config = AppConfig::get();
    let upload_dir = &config.upload.dir;
    let max_size = config.upload.max_size;

    if let Err(e) = fs::create_dir_all(upload_dir) {
        return Ok(storage_fault(PortalError::file_operation(format!(
            "创建上传目录失败: {e}"
        ))));
    }

    let mut stored: Option<(String, String, String, i64)> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        if name != "file" {
            continue;
        }
        if let Some((stored_name, ..)) = &stored {
            let _ = fs::remove_file(Path::new(upload_dir).join(stored_name));
            return Ok(bad_request("Only one file can be uploaded at a time"));
        }

        let original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let extension = extension_of(&original_name);
        if !config.upload.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&extension)) {
            return Ok(bad_request("File type not allowed"));
        }

        let file_type = field
            .content_type()
            .map(|ct| ct.essence_str().to_string())
            .filter(|ct| ct != "application/octet-stream")
            .unwrap_or_else(|| mime_for_extension(&extension).to_string());

        let stored_name = format!("{}{}", Uuid::new_v4(), extension);
        let file_path = Path::new(upload_dir).join(&stored_name);
        let mut f = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => {
                return Ok(storage_fault(PortalError::file_operation(format!(
                    "文件创建失败: {e}"
                ))));
            }
        };

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    let _ = fs::remove_file(&file_path);
                    return Ok(bad_request(&format!("Upload interrupted: {e}")));
                }
            };

            // 首块校验魔术字节
            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    let _ = fs::remove_file(&file_path);
                    return Ok(bad_request("File content does not match its extension"));
                }
            }

            total_size += data.len();
            if total_size > max_size {
                let _ = fs::remove_file(&file_path);
                return Ok(bad_request(&format!(
                    "File size exceeds the limit of {} MB",
                    max_size / (1024 * 1024)
                )));
            }
            if let Err(e) = f.write_all(&data) {
                let _ = fs::remove_file(&file_path);
                return Ok(storage_fault(PortalError::file_operation(format!(
                    "文件写入失败: {e}"
                ))));
            }
        }

        if total_size == 0 {
            let _ = fs::remove_file(&file_path);
            return Ok(bad_request("Uploaded file is empty"));
        }

        stored = Some((stored_name, original_name, file_type, total_size as i64));
    }

    let Some((stored_name, original_name, file_type, file_size)) = stored else {
        return Ok(bad_request("No file found in upload payload"));
    };

    let Ok(storage) = storage_from(req) else {
        let _ = fs::remove_file(Path::new(upload_dir).join(&stored_name));
        return Ok(storage_fault(PortalError::database_config(
            "Storage not found in app data",
        )));
    };

    match storage
        .upload_file(&stored_name, &original_name, file_size, &file_type, user_id)
        .await
    {
        Ok(file) => {
            info!(
                "User {} uploaded {} ({} bytes) as {}",
                user_id, file.original_name, file.file_size, file.stored_name
            );
            Ok(HttpResponse::Ok().json(FileUploadResponse {
                url: format!(
                    "{}/{}",
                    config.upload.public_prefix.trim_end_matches('/'),
                    file.stored_name
                ),
                filename: file.original_name,
                content_type: file.file_type,
                size: file.file_size,
            }))
        }
        Err(e) => {
            let _ = fs::remove_file(Path::new(upload_dir).join(&stored_name));
            Ok(storage_fault(e))
        }
    }
}
