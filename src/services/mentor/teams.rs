use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use crate::models::ApiResponse;
use crate::models::teams::MentorTeamListResponse;
use crate::models::users::UserRole;
use crate::services::access::{
    NOT_ASSIGNED_MESSAGE, current_user, forbidden, internal_error_response, mentor_team,
    require_role, storage_from,
};

pub async fn list_teams(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Mentor) {
        return Ok(resp);
    }

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };

    match storage.list_mentor_teams(user.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MentorTeamListResponse { items },
            "Teams retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list teams for mentor {}: {}", user.id, e);
            Ok(internal_error_response())
        }
    }
}

/// 团队详情；仅限该团队的导师，未分配与不存在的团队返回相同的 403
pub async fn get_team(request: &HttpRequest, team_id: i64) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Mentor) {
        return Ok(resp);
    }
    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };
    let team = match mentor_team(&storage, &user, team_id).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    match storage.get_team_overview(team.id).await {
        Ok(Some(overview)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            overview,
            "Team retrieved successfully",
        ))),
        Ok(None) => Ok(forbidden(NOT_ASSIGNED_MESSAGE)),
        Err(e) => {
            error!("Failed to load team {} for mentor {}: {}", team_id, user.id, e);
            Ok(internal_error_response())
        }
    }
}
