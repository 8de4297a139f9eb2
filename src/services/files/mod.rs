pub mod download;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

pub struct FileService;

impl FileService {
    pub fn new_lazy() -> Self {
        Self
    }

    // 上传单个文件，错误以纯文本返回
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(request, payload).await
    }

    // 按存储名读取已上传文件
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        stored_name: String,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(request, stored_name).await
    }
}
