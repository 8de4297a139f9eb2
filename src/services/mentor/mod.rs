pub mod proposals;
pub mod teams;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::proposals::ReviewProposalRequest;

pub struct MentorService;

impl MentorService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn list_teams(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        teams::list_teams(request).await
    }

    pub async fn get_team(&self, request: &HttpRequest, team_id: i64) -> ActixResult<HttpResponse> {
        teams::get_team(request, team_id).await
    }

    pub async fn get_proposal(
        &self,
        request: &HttpRequest,
        proposal_id: i64,
    ) -> ActixResult<HttpResponse> {
        proposals::get_proposal(request, proposal_id).await
    }

    pub async fn review_proposal(
        &self,
        request: &HttpRequest,
        proposal_id: i64,
        payload: ReviewProposalRequest,
    ) -> ActixResult<HttpResponse> {
        proposals::review_proposal(request, proposal_id, payload).await
    }
}
