use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::team_proposal;
use crate::models::proposals::{ProposalRequest, ProposalState};
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{
    current_user, forbidden, require_role, storage_error_response, storage_from, student_team,
};

/// 编辑申报；已通过的申报不可再编辑，被驳回的申报编辑后重新待审
pub async fn update_proposal(
    request: &HttpRequest,
    proposal_id: i64,
    payload: ProposalRequest,
) -> ActixResult<HttpResponse> {
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
    let existing = match team_proposal(&storage, &team, proposal_id).await {
        Ok(proposal) => proposal,
        Err(resp) => return Ok(resp),
    };
    if existing.state == ProposalState::Approved {
        return Ok(forbidden("Approved proposals cannot be edited"));
    }

    if let Err(errors) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::validation_failed(&errors)));
    }

    match storage.update_proposal(proposal_id, payload).await {
        Ok(Some(proposal)) => {
            info!(
                "Student {} updated proposal {} (state {})",
                user.id, proposal.id, proposal.state
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                proposal,
                "Proposal updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProposalNotFound,
            "Proposal not found",
        ))),
        Err(e) => Ok(storage_error_response(e, ErrorCode::Conflict)),
    }
}
