//! 项目申报存储操作

use super::SeaOrmStorage;
use crate::entity::proposals::{ActiveModel, Entity as Proposals};
use crate::errors::{PortalError, Result};
use crate::models::proposals::{Proposal, ProposalRequest, ProposalState};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

fn apply_request(model: &mut ActiveModel, req: ProposalRequest) {
    model.title = Set(req.title.trim().to_string());
    model.description = Set(req.description);
    model.content = Set(req.content);
    model.attachment = Set(req.attachment);
    model.poster_attachment = Set(req.poster_attachment);
    model.ppt_attachment = Set(req.ppt_attachment);
    model.link = Set(req.link);
}

impl SeaOrmStorage {
    /// 创建申报（初始状态为待审核）
    pub async fn create_proposal_impl(
        &self,
        team_id: i64,
        author_id: i64,
        req: ProposalRequest,
    ) -> Result<Proposal> {
        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            team_id: Set(team_id),
            author_id: Set(author_id),
            state: Set(ProposalState::Pending.to_string()),
            remarks: Set(None),
            reviewed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_request(&mut model, req);

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("创建申报失败: {e}")))?;

        Ok(result.into_proposal())
    }

    /// 通过 ID 获取申报
    pub async fn get_proposal_by_id_impl(&self, proposal_id: i64) -> Result<Option<Proposal>> {
        let result = Proposals::find_by_id(proposal_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询申报失败: {e}")))?;

        Ok(result.map(|m| m.into_proposal()))
    }

    /// 编辑申报；被驳回的申报编辑后重新进入待审核
    pub async fn update_proposal_impl(
        &self,
        proposal_id: i64,
        req: ProposalRequest,
    ) -> Result<Option<Proposal>> {
        let Some(existing) = Proposals::find_by_id(proposal_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询申报失败: {e}")))?
        else {
            return Ok(None);
        };

        let resubmitted = existing.state == ProposalState::Rejected.to_string();

        let mut model: ActiveModel = existing.into();
        apply_request(&mut model, req);
        if resubmitted {
            model.state = Set(ProposalState::Pending.to_string());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新申报失败: {e}")))?;

        Ok(Some(result.into_proposal()))
    }

    /// 导师审核申报
    pub async fn review_proposal_impl(
        &self,
        proposal_id: i64,
        state: ProposalState,
        remarks: Option<String>,
    ) -> Result<Option<Proposal>> {
        let Some(existing) = Proposals::find_by_id(proposal_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询申报失败: {e}")))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let mut model: ActiveModel = existing.into();
        model.state = Set(state.to_string());
        model.remarks = Set(remarks.filter(|r| !r.trim().is_empty()));
        model.reviewed_at = Set(Some(now));
        model.updated_at = Set(now);

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("审核申报失败: {e}")))?;

        Ok(Some(result.into_proposal()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{seed_team, seed_user, storage};
    use super::*;
    use crate::models::users::UserRole;

    fn request(title: &str) -> ProposalRequest {
        ProposalRequest {
            title: title.to_string(),
            description: "d".repeat(120),
            content: Some("Plan".to_string()),
            attachment: "/uploads/a.pdf".to_string(),
            poster_attachment: "/uploads/p.png".to_string(),
            ppt_attachment: "/uploads/s.pptx".to_string(),
            link: None,
        }
    }

    async fn fixture() -> (SeaOrmStorage, i64, i64) {
        let storage = storage().await;
        let lead = seed_user(&storage, "Lead", UserRole::Student).await;
        let team = seed_team(&storage, "T-01", None, lead, &[("Lead", Some(lead))]).await;
        (storage, team.team_id, lead)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (storage, team_id, lead) = fixture().await;
        let created = storage
            .create_proposal_impl(team_id, lead, request("  Solar Kiosk "))
            .await
            .unwrap();
        assert_eq!(created.title, "Solar Kiosk");
        assert_eq!(created.state, ProposalState::Pending);
        assert!(created.reviewed_at.is_none());

        let loaded = storage
            .get_proposal_by_id_impl(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, created);
        assert!(storage.get_proposal_by_id_impl(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_review_then_edit_resubmits() {
        let (storage, team_id, lead) = fixture().await;
        let created = storage
            .create_proposal_impl(team_id, lead, request("Solar Kiosk"))
            .await
            .unwrap();

        let reviewed = storage
            .review_proposal_impl(
                created.id,
                ProposalState::Rejected,
                Some("Budget missing".to_string()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reviewed.state, ProposalState::Rejected);
        assert_eq!(reviewed.remarks.as_deref(), Some("Budget missing"));
        assert!(reviewed.reviewed_at.is_some());

        let edited = storage
            .update_proposal_impl(created.id, request("Solar Kiosk v2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.title, "Solar Kiosk v2");
        assert_eq!(edited.state, ProposalState::Pending);
        assert_eq!(edited.remarks.as_deref(), Some("Budget missing"));
    }

    #[tokio::test]
    async fn test_edit_keeps_approved_state() {
        let (storage, team_id, lead) = fixture().await;
        let created = storage
            .create_proposal_impl(team_id, lead, request("Solar Kiosk"))
            .await
            .unwrap();
        storage
            .review_proposal_impl(created.id, ProposalState::Approved, Some("  ".to_string()))
            .await
            .unwrap();

        let edited = storage
            .update_proposal_impl(created.id, request("Solar Kiosk v2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.state, ProposalState::Approved);
        assert!(edited.remarks.is_none());
        assert!(
            storage
                .update_proposal_impl(999, request("Missing"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
