pub mod create;
pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::error;

use crate::models::proposals::{Proposal, ProposalRequest};
use crate::models::teams::Team;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{forbidden, internal_error_response};
use crate::storage::Storage;

pub struct ProposalService;

impl ProposalService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn create_proposal(
        &self,
        request: &HttpRequest,
        payload: ProposalRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_proposal(request, payload).await
    }

    pub async fn get_proposal(
        &self,
        request: &HttpRequest,
        proposal_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_proposal(request, proposal_id).await
    }

    pub async fn update_proposal(
        &self,
        request: &HttpRequest,
        proposal_id: i64,
        payload: ProposalRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_proposal(request, proposal_id, payload).await
    }
}

/// 读取申报并确认属于学生所在团队
pub(crate) async fn team_proposal(
    storage: &Arc<dyn Storage>,
    team: &Team,
    proposal_id: i64,
) -> Result<Proposal, HttpResponse> {
    match storage.get_proposal_by_id(proposal_id).await {
        Ok(Some(proposal)) if proposal.team_id == team.id => Ok(proposal),
        Ok(Some(_)) => Err(forbidden("You do not have permission to access this proposal")),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProposalNotFound,
            "Proposal not found",
        ))),
        Err(e) => {
            error!("Failed to load proposal {}: {}", proposal_id, e);
            Err(internal_error_response())
        }
    }
}
