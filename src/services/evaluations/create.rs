use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{check_membership, fill_member_snapshot, membership_response, validation_response};
use crate::models::evaluations::EvaluationPayload;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::scoring::validate_evaluation;
use crate::services::access::{
    current_user, mentor_team, require_role, storage_error_response, storage_from,
};

pub async fn create_evaluation(
    request: &HttpRequest,
    payload: EvaluationPayload,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Mentor) {
        return Ok(resp);
    }

    // 没有 teamId 无法做归属校验，直接返回全部字段错误
    let Some(team_id) = payload.team_id else {
        let errors = validate_evaluation(&payload).err().unwrap_or_default();
        return Ok(validation_response(&errors));
    };

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };
    let team = match mentor_team(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    let mut evaluation = match validate_evaluation(&payload) {
        Ok(evaluation) => evaluation,
        Err(errors) => return Ok(validation_response(&errors)),
    };
    if let Err(error) = check_membership(&team, &evaluation) {
        return Ok(membership_response(error));
    }
    fill_member_snapshot(&team, &mut evaluation);

    match storage.create_evaluation(team.id, user.id, evaluation).await {
        Ok(created) => {
            info!(
                "Mentor {} created evaluation {} for team {}",
                user.id, created.id, team.team_number
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                created,
                "Evaluation created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::EvaluationAlreadyExists)),
    }
}
