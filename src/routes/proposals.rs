use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::proposals::ProposalRequest;
use crate::models::users::UserRole;
use crate::services::{ProposalService, StudentService};

static PROPOSAL_SERVICE: Lazy<ProposalService> = Lazy::new(ProposalService::new_lazy);
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn create_proposal(
    request: HttpRequest,
    payload: web::Json<ProposalRequest>,
) -> ActixResult<HttpResponse> {
    PROPOSAL_SERVICE
        .create_proposal(&request, payload.into_inner())
        .await
}

pub async fn get_proposal(
    request: HttpRequest,
    proposal_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    PROPOSAL_SERVICE
        .get_proposal(&request, proposal_id.into_inner())
        .await
}

pub async fn update_proposal(
    request: HttpRequest,
    proposal_id: web::Path<i64>,
    payload: web::Json<ProposalRequest>,
) -> ActixResult<HttpResponse> {
    PROPOSAL_SERVICE
        .update_proposal(&request, proposal_id.into_inner(), payload.into_inner())
        .await
}

pub async fn get_team(request: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_team(&request).await
}

// 配置路由
pub fn configure_proposal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/student")
            .wrap(RequireRole::new_any(UserRole::student_roles()))
            .wrap(RequireJWT::json())
            .route("/team", web::get().to(get_team))
            .route("/proposals", web::post().to(create_proposal))
            .service(
                web::resource("/proposals/{id}")
                    .route(web::get().to(get_proposal))
                    .route(web::put().to(update_proposal)),
            ),
    );
}
