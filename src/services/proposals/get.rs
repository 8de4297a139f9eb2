use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::team_proposal;
use crate::models::ApiResponse;
use crate::models::users::UserRole;
use crate::services::access::{current_user, require_role, storage_from, student_team};

pub async fn get_proposal(request: &HttpRequest, proposal_id: i64) -> ActixResult<HttpResponse> {
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
    let team = match student_team(&storage, &user).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    match team_proposal(&storage, &team, proposal_id).await {
        Ok(proposal) => Ok(HttpResponse::Ok().json(ApiResponse::success(proposal, "Proposal found"))),
        Err(resp) => Ok(resp),
    }
}
