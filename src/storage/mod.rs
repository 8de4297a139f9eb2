use crate::models::{
    evaluations::{Evaluation, responses::EvaluationExportRow},
    files::File,
    proposals::{Proposal, ProposalRequest, ProposalState},
    teams::{MentorTeamSummary, Team, TeamOverview},
    users::User,
};
use crate::scoring::ValidatedEvaluation;

use crate::errors::Result;
use std::sync::Arc;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 团队（只读）
    // 获取团队及其当前成员（按顺序）
    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>>;
    // 获取学生所在团队（队长或当前成员）
    async fn get_team_by_student(&self, user_id: i64) -> Result<Option<Team>>;
    // 列出导师负责的团队
    async fn list_mentor_teams(&self, mentor_id: i64) -> Result<Vec<MentorTeamSummary>>;
    // 所有团队全貌（管理员）
    async fn list_team_overviews(&self) -> Result<Vec<TeamOverview>>;
    // 单个团队全貌：成员、导师、队长、申报、评分
    async fn get_team_overview(&self, team_id: i64) -> Result<Option<TeamOverview>>;

    /// 评分
    // 获取团队评分（含个人评分）
    async fn get_evaluation_by_team_id(&self, team_id: i64) -> Result<Option<Evaluation>>;
    // 创建评分，已存在时返回 Conflict
    async fn create_evaluation(
        &self,
        team_id: i64,
        mentor_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Evaluation>;
    // 整体替换评分，不存在时返回 None
    async fn replace_evaluation(
        &self,
        team_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Option<Evaluation>>;
    // 导出所有个人评分
    async fn list_evaluation_export_rows(&self) -> Result<Vec<EvaluationExportRow>>;

    /// 项目申报
    async fn create_proposal(
        &self,
        team_id: i64,
        author_id: i64,
        proposal: ProposalRequest,
    ) -> Result<Proposal>;
    async fn get_proposal_by_id(&self, proposal_id: i64) -> Result<Option<Proposal>>;
    // 编辑申报，被驳回的申报重新回到待审核
    async fn update_proposal(
        &self,
        proposal_id: i64,
        proposal: ProposalRequest,
    ) -> Result<Option<Proposal>>;
    // 导师审核
    async fn review_proposal(
        &self,
        proposal_id: i64,
        state: ProposalState,
        remarks: Option<String>,
    ) -> Result<Option<Proposal>>;

    /// 文件
    // 记录上传文件
    async fn upload_file(
        &self,
        stored_name: &str,
        original_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File>;
    // 通过存储名获取文件信息
    async fn get_file_by_stored_name(&self, stored_name: &str) -> Result<Option<File>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
