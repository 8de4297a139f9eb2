use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::teams::TeamExportRequest;
use crate::models::users::UserRole;
use crate::services::AdminService;

static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

pub async fn export_evaluations(request: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.export_evaluations(&request).await
}

pub async fn list_teams(request: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_teams(&request).await
}

pub async fn export_teams_default(request: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.export_teams_default(&request).await
}

pub async fn export_teams(
    request: HttpRequest,
    payload: web::Json<TeamExportRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .export_teams(&request, payload.into_inner())
        .await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(RequireRole::new(&UserRole::Admin))
            .wrap(RequireJWT::json())
            .route("/teams", web::get().to(list_teams))
            .route("/export/evaluations", web::get().to(export_evaluations))
            .service(
                web::resource("/export/teams")
                    .route(web::get().to(export_teams_default))
                    .route(web::post().to(export_teams)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{bearer, param_handlers, storage_data};
    use crate::storage::sea_orm_storage::test_support::{seed_team, seed_user, storage};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    macro_rules! admin_app {
        ($storage:expr) => {
            test::init_service(
                App::new()
                    .app_data(storage_data(&$storage))
                    .configure(param_handlers)
                    .configure(configure_admin_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_team_list_is_admin_only() {
        let storage = storage().await;
        let admin = seed_user(&storage, "Admin", UserRole::Admin).await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        seed_team(&storage, "T-01", Some(mentor), lead, &[("Lead", Some(lead)), ("Bina", None)]).await;
        let app = admin_app!(storage);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/admin/teams").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/teams")
                .insert_header(bearer(lead, "student"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/teams")
                .insert_header(bearer(admin, "admin"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["teamNumber"], "T-01");
        assert_eq!(items[0]["mentor"]["name"], "Mentor");
        assert_eq!(items[0]["members"].as_array().unwrap().len(), 2);
        assert!(items[0]["evaluation"].is_null());
    }

    #[actix_web::test]
    async fn test_team_export_columns() {
        let storage = storage().await;
        let admin = seed_user(&storage, "Admin", UserRole::Admin).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        seed_team(&storage, "T-01", None, lead, &[("Lead", Some(lead)), ("Bina", None)]).await;
        let app = admin_app!(storage);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/export/teams")
                .insert_header(bearer(admin, "admin"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv; charset=utf-8"
        );
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.starts_with("Team Number,Team Status,Project Title,"));
        assert!(body.contains("No Mentor"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/export/teams")
                .insert_header(bearer(admin, "admin"))
                .set_json(json!({ "columns": [] }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "No columns selected");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/export/teams")
                .insert_header(bearer(admin, "admin"))
                .set_json(json!({ "columns": ["teamNumber", "mentorPhone"] }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid columns: mentorPhone");
        assert_eq!(body["error"], "ValidationError");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/export/teams")
                .insert_header(bearer(admin, "admin"))
                .set_json(json!({ "columns": ["memberCount", "teamNumber", "memberNames"] }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert_eq!(body, "Total Members,Team Number,Team Members\n2,T-01,\"Lead\nBina\"\n");
    }
}
