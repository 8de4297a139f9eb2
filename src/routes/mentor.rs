use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::evaluations::configure_evaluation_routes;
use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::proposals::ReviewProposalRequest;
use crate::models::users::UserRole;
use crate::services::MentorService;

static MENTOR_SERVICE: Lazy<MentorService> = Lazy::new(MentorService::new_lazy);

pub async fn list_teams(request: HttpRequest) -> ActixResult<HttpResponse> {
    MENTOR_SERVICE.list_teams(&request).await
}

pub async fn get_team(request: HttpRequest, team_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    MENTOR_SERVICE.get_team(&request, team_id.into_inner()).await
}

pub async fn get_proposal(
    request: HttpRequest,
    proposal_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    MENTOR_SERVICE
        .get_proposal(&request, proposal_id.into_inner())
        .await
}

pub async fn review_proposal(
    request: HttpRequest,
    proposal_id: web::Path<i64>,
    payload: web::Json<ReviewProposalRequest>,
) -> ActixResult<HttpResponse> {
    MENTOR_SERVICE
        .review_proposal(&request, proposal_id.into_inner(), payload.into_inner())
        .await
}

// 配置路由
pub fn configure_mentor_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/mentor")
            .wrap(RequireRole::new_any(UserRole::mentor_roles()))
            .wrap(RequireJWT::json())
            .configure(configure_evaluation_routes)
            .route("/teams", web::get().to(list_teams))
            .route("/teams/{id}", web::get().to(get_team))
            .service(
                web::resource("/proposals/{id}")
                    .route(web::get().to(get_proposal))
                    .route(web::put().to(review_proposal)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{bearer, param_handlers, storage_data};
    use crate::storage::sea_orm_storage::test_support::{SeededTeam, seed_team, seed_user, storage};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    fn body_for(team: &SeededTeam, marks: f64) -> Value {
        let members: Vec<Value> = team
            .member_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({
                    "teamMemberId": id,
                    "memberName": format!("Member {i}"),
                    "individualScore": 2.5,
                    "learningContribution": 2,
                    "presentationSkill": 1.5,
                    "contributionToProject": 2,
                    "totalIndividualMarks": 999
                })
            })
            .collect();
        json!({
            "teamId": team.team_id,
            "posterMarks": 2,
            "videoMarks": 3,
            "reportMarks": marks,
            "pptMarks": 3,
            "groupScore": 999,
            "individualEvaluations": members
        })
    }

    macro_rules! mentor_app {
        ($storage:expr) => {
            test::init_service(
                App::new()
                    .app_data(storage_data(&$storage))
                    .configure(param_handlers)
                    .configure(configure_mentor_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_requires_token_and_mentor_role() {
        let storage = storage().await;
        let student = seed_user(&storage, "Student", UserRole::Student).await;
        let app = mentor_app!(storage);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/mentor/teams").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unauthorized");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/mentor/teams")
                .insert_header(bearer(student, "student"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Forbidden");
    }

    #[actix_web::test]
    async fn test_unknown_and_unassigned_team_look_identical() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let other = seed_user(&storage, "Other", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(&storage, "T-01", Some(other), lead, &[("Lead", Some(lead))]).await;
        let app = mentor_app!(storage);

        let mut bodies = Vec::new();
        for team_id in [team.team_id, 9999] {
            let resp = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("/api/v1/mentor/evaluations?teamId={team_id}"))
                    .insert_header(bearer(mentor, "mentor"))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            let mut body: Value = test::read_body_json(resp).await;
            body.as_object_mut().unwrap().remove("timestamp");
            bodies.push(body);
        }
        assert_eq!(bodies[0], bodies[1]);
    }

    #[actix_web::test]
    async fn test_create_fetch_conflict_and_replace() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(
            &storage,
            "T-01",
            Some(mentor),
            lead,
            &[("Lead", Some(lead)), ("Bina", None)],
        )
        .await;
        let app = mentor_app!(storage);

        // 尚无评分时返回团队快照
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/mentor/evaluations?teamId={}", team.team_id))
                .insert_header(bearer(mentor, "mentor"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["found"], false);
        assert_eq!(body["data"]["teamShell"]["members"].as_array().unwrap().len(), 2);

        // 更新不存在的评分
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body_for(&team, 2.5))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body_for(&team, 2.5))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let evaluation = &body["data"];
        assert_eq!(evaluation["groupScore"], 10.5);
        assert_eq!(evaluation["status"], "DRAFT");
        let rows = evaluation["individualEvaluations"].as_array().unwrap();
        assert_eq!(rows[0]["externalEvaluatorMarks"], 5.5);
        assert_eq!(rows[0]["totalIndividualMarks"], 18.5);
        assert_eq!(rows[1]["memberEmail"], "bina@example.edu");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body_for(&team, 0.0))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Conflict");

        let mut update = body_for(&team, 3.0);
        update["status"] = json!("SUBMITTED");
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(update)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["groupScore"], 11);
        assert_eq!(body["data"]["status"], "SUBMITTED");
        assert_eq!(
            body["data"]["individualEvaluations"][0]["totalIndividualMarks"],
            19
        );
    }

    #[actix_web::test]
    async fn test_invalid_marks_report_every_field_and_persist_nothing() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(&storage, "T-01", Some(mentor), lead, &[("Lead", Some(lead))]).await;
        let app = mentor_app!(storage);

        let mut body = body_for(&team, 4.0);
        body["posterMarks"] = json!(2.5);
        body["individualEvaluations"][0]["presentationSkill"] = json!(3);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "ValidationError");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec![
                "posterMarks",
                "reportMarks",
                "individualEvaluations[0].presentationSkill"
            ]
        );

        assert!(
            storage
                .get_evaluation_by_team_id_impl(team.team_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn test_member_list_must_match_team() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(
            &storage,
            "T-01",
            Some(mentor),
            lead,
            &[("Lead", Some(lead)), ("Bina", None)],
        )
        .await;
        let app = mentor_app!(storage);

        let partial = SeededTeam {
            team_id: team.team_id,
            member_ids: vec![team.member_ids[0]],
        };
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body_for(&partial, 2.0))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 2002);
        assert_eq!(body["details"][0]["field"], "individualEvaluations");
    }

    #[actix_web::test]
    async fn test_review_proposal_of_mentored_team() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(&storage, "T-01", Some(mentor), lead, &[("Lead", Some(lead))]).await;
        let proposal = storage
            .create_proposal_impl(
                team.team_id,
                lead,
                crate::models::proposals::ProposalRequest {
                    title: "Solar Kiosk".to_string(),
                    description: "d".repeat(120),
                    attachment: "/uploads/a.pdf".to_string(),
                    poster_attachment: "/uploads/b.png".to_string(),
                    ppt_attachment: "/uploads/c.pptx".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = mentor_app!(storage);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/mentor/proposals/{}", proposal.id))
                .insert_header(bearer(mentor, "mentor"))
                .set_json(json!({ "state": "PENDING" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/mentor/proposals/{}", proposal.id))
                .insert_header(bearer(mentor, "mentor"))
                .set_json(json!({ "state": "REJECTED" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["state"], "REJECTED");
        assert_eq!(body["data"]["remarks"], "Proposal needs revision");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/mentor/proposals/abc")
                .insert_header(bearer(mentor, "mentor"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_team_detail_for_assigned_mentor_only() {
        let storage = storage().await;
        let mentor = seed_user(&storage, "Mentor", UserRole::Mentor).await;
        let other = seed_user(&storage, "Other", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let bram = seed_user(&storage, "Bram", UserRole::Student).await;
        let team = seed_team(
            &storage,
            "T-01",
            Some(mentor),
            lead,
            &[("Lead", Some(lead)), ("Bina", None)],
        )
        .await;
        let foreign = seed_team(&storage, "T-02", Some(other), bram, &[("Bram", Some(bram))]).await;
        storage
            .create_proposal_impl(
                team.team_id,
                lead,
                crate::models::proposals::ProposalRequest {
                    title: "Solar Kiosk".to_string(),
                    description: "d".repeat(120),
                    attachment: "/uploads/a.pdf".to_string(),
                    poster_attachment: "/uploads/b.png".to_string(),
                    ppt_attachment: "/uploads/c.pptx".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = mentor_app!(storage);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mentor/evaluations")
                .insert_header(bearer(mentor, "mentor"))
                .set_json(body_for(&team, 2.5))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/mentor/teams/{}", team.team_id))
                .insert_header(bearer(mentor, "mentor"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["teamNumber"], "T-01");
        assert_eq!(data["members"].as_array().unwrap().len(), 2);
        assert_eq!(data["mentor"]["id"], mentor);
        assert_eq!(data["lead"]["email"], "lead@example.edu");
        assert_eq!(data["proposals"][0]["title"], "Solar Kiosk");
        assert_eq!(data["evaluation"]["groupScore"], 10.5);

        let mut bodies = Vec::new();
        for team_id in [foreign.team_id, 9999] {
            let resp = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("/api/v1/mentor/teams/{team_id}"))
                    .insert_header(bearer(mentor, "mentor"))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            let mut body: Value = test::read_body_json(resp).await;
            body.as_object_mut().unwrap().remove("timestamp");
            bodies.push(body);
        }
        assert_eq!(bodies[0], bodies[1]);
    }
}
