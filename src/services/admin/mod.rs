pub mod export;
pub mod team_export;
pub mod teams;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::teams::TeamExportRequest;

pub struct AdminService;

impl AdminService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn export_evaluations(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        export::export_evaluations(request).await
    }

    pub async fn list_teams(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        teams::list_teams(request).await
    }

    /// 默认列导出
    pub async fn export_teams_default(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        team_export::export_teams(request, team_export::DEFAULT_TEAM_COLUMNS).await
    }

    pub async fn export_teams(
        &self,
        request: &HttpRequest,
        payload: TeamExportRequest,
    ) -> ActixResult<HttpResponse> {
        team_export::export_teams(request, &payload.columns).await
    }
}
