use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use crate::models::ApiResponse;
use crate::models::teams::TeamOverviewListResponse;
use crate::models::users::UserRole;
use crate::services::access::{current_user, internal_error_response, require_role, storage_from};

pub async fn list_teams(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Admin) {
        return Ok(resp);
    }
    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };

    match storage.list_team_overviews().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TeamOverviewListResponse { items },
            "Teams retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to load team overviews: {}", e);
            Ok(internal_error_response())
        }
    }
}
