use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::evaluations::{EvaluationPayload, EvaluationQuery};
use crate::services::EvaluationService;

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn get_evaluation(
    request: HttpRequest,
    query: web::Query<EvaluationQuery>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.get_evaluation(&request, query).await
}

pub async fn create_evaluation(
    request: HttpRequest,
    payload: web::Json<EvaluationPayload>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .create_evaluation(&request, payload.into_inner())
        .await
}

pub async fn update_evaluation(
    request: HttpRequest,
    payload: web::Json<EvaluationPayload>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .update_evaluation(&request, payload.into_inner())
        .await
}

// 挂在导师作用域下
pub fn configure_evaluation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/evaluations")
            .route(web::get().to(get_evaluation))
            .route(web::post().to(create_evaluation))
            .route(web::put().to(update_evaluation)),
    );
}
