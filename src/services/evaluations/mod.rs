pub mod create;
pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::collections::BTreeSet;

use crate::models::evaluations::{EvaluationPayload, EvaluationQuery};
use crate::models::teams::Team;
use crate::models::{ApiResponse, ErrorCode};
use crate::scoring::{FieldError, ValidatedEvaluation};

pub struct EvaluationService;

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn get_evaluation(
        &self,
        request: &HttpRequest,
        query: web::Query<EvaluationQuery>,
    ) -> ActixResult<HttpResponse> {
        get::get_evaluation(request, query.into_inner()).await
    }

    pub async fn create_evaluation(
        &self,
        request: &HttpRequest,
        payload: EvaluationPayload,
    ) -> ActixResult<HttpResponse> {
        create::create_evaluation(request, payload).await
    }

    pub async fn update_evaluation(
        &self,
        request: &HttpRequest,
        payload: EvaluationPayload,
    ) -> ActixResult<HttpResponse> {
        update::update_evaluation(request, payload).await
    }
}

/// 提交的成员必须恰好是团队当前成员
pub(crate) fn check_membership(team: &Team, evaluation: &ValidatedEvaluation) -> Result<(), FieldError> {
    let current: BTreeSet<i64> = team.members.iter().map(|m| m.id).collect();
    let submitted: BTreeSet<i64> = evaluation.member_ids().collect();

    if current == submitted {
        return Ok(());
    }

    let missing: Vec<String> = current.difference(&submitted).map(i64::to_string).collect();
    let unknown: Vec<String> = submitted.difference(&current).map(i64::to_string).collect();

    let mut reason = String::from("must list exactly the current team members");
    if !missing.is_empty() {
        reason.push_str(&format!(" (missing: {})", missing.join(", ")));
    }
    if !unknown.is_empty() {
        reason.push_str(&format!(" (not in team: {})", unknown.join(", ")));
    }
    Err(FieldError::invalid("individualEvaluations", reason))
}

/// 未提交邮箱的成员使用团队成员快照中的邮箱
pub(crate) fn fill_member_snapshot(team: &Team, evaluation: &mut ValidatedEvaluation) {
    for member in &mut evaluation.members {
        if member.member_email.is_none()
            && let Some(snapshot) = team.members.iter().find(|m| m.id == member.team_member_id)
        {
            member.member_email = Some(snapshot.email.clone());
        }
    }
}

pub(crate) fn validation_response(errors: &[FieldError]) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::validation_failed(errors))
}

pub(crate) fn membership_response(error: FieldError) -> HttpResponse {
    let body = ApiResponse {
        code: ErrorCode::EvaluationMembersMismatch as i32,
        ..ApiResponse::validation_failed(std::slice::from_ref(&error))
    };
    HttpResponse::BadRequest().json(body)
}
