pub mod team;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

pub struct StudentService;

impl StudentService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn get_team(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        team::get_team(request).await
    }
}
