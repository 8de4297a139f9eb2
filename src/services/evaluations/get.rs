use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use crate::models::evaluations::{EvaluationQuery, FetchEvaluationResponse};
use crate::models::teams::TeamShell;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{
    current_user, internal_error_response, mentor_team, require_role, storage_from,
};

pub async fn get_evaluation(
    request: &HttpRequest,
    query: EvaluationQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Mentor) {
        return Ok(resp);
    }

    let Some(team_id) = query.team_id else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "teamId is required",
        )));
    };

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };
    let team = match mentor_team(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    match storage.get_evaluation_by_team_id(team.id).await {
        Ok(Some(evaluation)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FetchEvaluationResponse::found(evaluation),
            "Evaluation found",
        ))),
        Ok(None) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FetchEvaluationResponse::shell(TeamShell::from(team)),
            "No evaluation found, returning team data",
        ))),
        Err(e) => {
            error!("Failed to load evaluation for team {}: {}", team_id, e);
            Ok(internal_error_response())
        }
    }
}
