use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::proposals::ProposalRequest;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{
    current_user, require_role, storage_error_response, storage_from, student_team,
};

pub async fn create_proposal(
    request: &HttpRequest,
    payload: ProposalRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Student) {
        return Ok(resp);
    }

    // 附件完整性由服务端独立校验
    if let Err(errors) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(&errors)));
    }

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };
    let team = match student_team(&storage, &user).await {
        Ok(team) => team,
        Err(resp) => return Ok(resp),
    };

    match storage.create_proposal(team.id, user.id, payload).await {
        Ok(proposal) => {
            info!(
                "Student {} submitted proposal {} for team {}",
                user.id, proposal.id, team.team_number
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                proposal,
                "Proposal submitted successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(e, ErrorCode::Conflict)),
    }
}
