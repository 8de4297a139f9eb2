use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::services::FileService;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_upload(&request, payload).await
}

pub async fn handle_download(
    request: HttpRequest,
    stored_name: web::Path<String>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .handle_download(&request, stored_name.into_inner())
        .await
}

// 配置路由：上传需要登录（纯文本错误），已上传文件按地址公开读取
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    let public_prefix = AppConfig::get()
        .upload
        .public_prefix
        .trim_end_matches('/')
        .to_string();

    cfg.service(
        web::scope("/api/v1/files")
            .wrap(RequireJWT::plain_text())
            .route("/upload", web::post().to(handle_upload)),
    )
    .service(
        web::scope(&public_prefix).route("/{stored_name}", web::get().to(handle_download)),
    );
}
