use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use crate::models::teams::StudentTeamResponse;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user, internal_error_response, require_role, storage_from};

fn team_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::TeamNotFound,
        "Team not found",
    ))
}

/// 学生所在团队及统计
pub async fn get_team(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Student) {
        return Ok(resp);
    }
    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };

    let team = match storage.get_team_by_student(user.id).await {
        Ok(Some(team)) => team,
        Ok(None) => return Ok(team_not_found()),
        Err(e) => {
            error!("Failed to find team for student {}: {}", user.id, e);
            return Ok(internal_error_response());
        }
    };

    match storage.get_team_overview(team.id).await {
        Ok(Some(overview)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentTeamResponse::from(overview),
            "Team retrieved successfully",
        ))),
        Ok(None) => Ok(team_not_found()),
        Err(e) => {
            error!("Failed to load team {}: {}", team.id, e);
            Ok(internal_error_response())
        }
    }
}
