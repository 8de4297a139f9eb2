use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::proposals::{Proposal, ProposalState, ReviewProposalRequest};
use crate::models::users::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{
    current_user, internal_error_response, mentor_team, require_role, storage_from,
};
use crate::storage::Storage;

/// 读取申报并确认导师负责其团队
async fn mentored_proposal(
    storage: &Arc<dyn Storage>,
    mentor: &User,
    proposal_id: i64,
) -> Result<Proposal, HttpResponse> {
    let proposal = match storage.get_proposal_by_id(proposal_id).await {
        Ok(Some(proposal)) => proposal,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ProposalNotFound,
                "Proposal not found",
            )));
        }
        Err(e) => {
            error!("Failed to load proposal {}: {}", proposal_id, e);
            return Err(internal_error_response());
        }
    };
    mentor_team(storage, mentor, proposal.team_id).await?;
    Ok(proposal)
}

/// 审核未填写备注时的默认备注
fn default_remarks(state: ProposalState) -> &'static str {
    match state {
        ProposalState::Approved => "Proposal approved",
        _ => "Proposal needs revision",
    }
}

pub async fn get_proposal(request: &HttpRequest, proposal_id: i64) -> ActixResult<HttpResponse> {
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

    match mentored_proposal(&storage, &user, proposal_id).await {
        Ok(proposal) => Ok(HttpResponse::Ok().json(ApiResponse::success(proposal, "Proposal found"))),
        Err(resp) => Ok(resp),
    }
}

pub async fn review_proposal(
    request: &HttpRequest,
    proposal_id: i64,
    payload: ReviewProposalRequest,
) -> ActixResult<HttpResponse> {
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

    if let Err(resp) = mentored_proposal(&storage, &user, proposal_id).await {
        return Ok(resp);
    }

    if payload.state == ProposalState::Pending {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ProposalInvalid,
            "state must be APPROVED or REJECTED",
        )));
    }

    let remarks = payload
        .remarks
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| default_remarks(payload.state).to_string());

    match storage
        .review_proposal(proposal_id, payload.state, Some(remarks))
        .await
    {
        Ok(Some(proposal)) => {
            info!(
                "Mentor {} marked proposal {} as {}",
                user.id, proposal.id, proposal.state
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                proposal,
                "Proposal reviewed successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProposalNotFound,
            "Proposal not found",
        ))),
        Err(e) => {
            error!("Failed to review proposal {}: {}", proposal_id, e);
            Ok(internal_error_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remarks() {
        assert_eq!(default_remarks(ProposalState::Approved), "Proposal approved");
        assert_eq!(
            default_remarks(ProposalState::Rejected),
            "Proposal needs revision"
        );
    }
}
