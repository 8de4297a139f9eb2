//! 团队查询（团队与成员由团队管理流程维护，这里只读）

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::evaluations::load_evaluations;
use crate::entity::evaluations::{Column as EvaluationColumn, Entity as Evaluations};
use crate::entity::proposals::{Column as ProposalColumn, Entity as Proposals};
use crate::entity::team_members::{Column as MemberColumn, Entity as TeamMembers};
use crate::entity::teams::{self, Column, Entity as Teams};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::evaluations::{Evaluation, EvaluationStatus};
use crate::models::proposals::Proposal;
use crate::models::teams::{
    MentorTeamSummary, Team, TeamMember, TeamOverview, TeamStatus, UserBrief,
};
use crate::scoring::Marks;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

/// 团队当前成员（排除已移出的），按 position 排序
pub(super) async fn current_members<C: ConnectionTrait>(
    conn: &C,
    team_id: i64,
) -> Result<Vec<TeamMember>> {
    let members = TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team_id))
        .filter(MemberColumn::RemovedAt.is_null())
        .order_by_asc(MemberColumn::Position)
        .order_by_asc(MemberColumn::Id)
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询团队成员失败: {e}")))?;

    Ok(members.into_iter().map(|m| m.into_team_member()).collect())
}

pub(super) async fn load_team<C: ConnectionTrait>(conn: &C, team_id: i64) -> Result<Option<Team>> {
    let Some(team) = Teams::find_by_id(team_id)
        .one(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询团队失败: {e}")))?
    else {
        return Ok(None);
    };

    let members = current_members(conn, team.id).await?;
    Ok(Some(team.into_team(members)))
}

/// 为一组团队批量装配全貌，查询次数与团队数量无关
async fn build_overviews<C: ConnectionTrait>(
    conn: &C,
    teams: Vec<teams::Model>,
) -> Result<Vec<TeamOverview>> {
    if teams.is_empty() {
        return Ok(Vec::new());
    }

    let team_ids: Vec<i64> = teams.iter().map(|t| t.id).collect();
    let user_ids: Vec<i64> = teams
        .iter()
        .flat_map(|t| t.mentor_id.into_iter().chain(Some(t.lead_id)))
        .collect();

    let mut members_by_team: HashMap<i64, Vec<TeamMember>> = HashMap::new();
    let members = TeamMembers::find()
        .filter(MemberColumn::TeamId.is_in(team_ids.clone()))
        .filter(MemberColumn::RemovedAt.is_null())
        .order_by_asc(MemberColumn::Position)
        .order_by_asc(MemberColumn::Id)
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询团队成员失败: {e}")))?;
    for member in members {
        members_by_team
            .entry(member.team_id)
            .or_default()
            .push(member.into_team_member());
    }

    let users: HashMap<i64, UserBrief> = Users::find()
        .filter(UserColumn::Id.is_in(user_ids))
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?
        .into_iter()
        .map(|u| {
            (
                u.id,
                UserBrief {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                },
            )
        })
        .collect();

    let mut proposals_by_team: HashMap<i64, Vec<Proposal>> = HashMap::new();
    let proposals = Proposals::find()
        .filter(ProposalColumn::TeamId.is_in(team_ids.clone()))
        .order_by_desc(ProposalColumn::CreatedAt)
        .order_by_desc(ProposalColumn::Id)
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询申报失败: {e}")))?;
    for proposal in proposals {
        proposals_by_team
            .entry(proposal.team_id)
            .or_default()
            .push(proposal.into_proposal());
    }

    let headers = Evaluations::find()
        .filter(EvaluationColumn::TeamId.is_in(team_ids))
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询评分失败: {e}")))?;
    let mut evaluations: HashMap<i64, Evaluation> = load_evaluations(conn, headers)
        .await?
        .into_iter()
        .map(|e| (e.team_id, e))
        .collect();

    Ok(teams
        .into_iter()
        .map(|team| {
            let mentor = team.mentor_id.and_then(|id| users.get(&id).cloned());
            let lead = users.get(&team.lead_id).cloned();
            let proposals = proposals_by_team.remove(&team.id).unwrap_or_default();
            let evaluation = evaluations.remove(&team.id);
            let members = members_by_team.remove(&team.id).unwrap_or_default();
            TeamOverview {
                team: team.into_team(members),
                mentor,
                lead,
                proposals,
                evaluation,
            }
        })
        .collect())
}

impl SeaOrmStorage {
    /// 所有团队全貌，新建的在前
    pub async fn list_team_overviews_impl(&self) -> Result<Vec<TeamOverview>> {
        let teams = Teams::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询团队列表失败: {e}")))?;

        build_overviews(&self.db, teams).await
    }

    pub async fn get_team_overview_impl(&self, team_id: i64) -> Result<Option<TeamOverview>> {
        let Some(team) = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询团队失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(build_overviews(&self.db, vec![team]).await?.pop())
    }

    /// 通过 ID 获取团队
    pub async fn get_team_by_id_impl(&self, team_id: i64) -> Result<Option<Team>> {
        load_team(&self.db, team_id).await
    }

    /// 获取学生所在团队
    pub async fn get_team_by_student_impl(&self, user_id: i64) -> Result<Option<Team>> {
        let membership = TeamMembers::find()
            .filter(MemberColumn::UserId.eq(user_id))
            .filter(MemberColumn::RemovedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询团队成员失败: {e}")))?;

        let team_id = match membership {
            Some(member) => Some(member.team_id),
            None => Teams::find()
                .filter(Column::LeadId.eq(user_id))
                .one(&self.db)
                .await
                .map_err(|e| PortalError::database_operation(format!("查询团队失败: {e}")))?
                .map(|team| team.id),
        };

        match team_id {
            Some(team_id) => load_team(&self.db, team_id).await,
            None => Ok(None),
        }
    }

    /// 列出导师负责的团队及评分状态
    pub async fn list_mentor_teams_impl(&self, mentor_id: i64) -> Result<Vec<MentorTeamSummary>> {
        let teams = Teams::find()
            .filter(Column::MentorId.eq(mentor_id))
            .order_by_asc(Column::TeamNumber)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询团队列表失败: {e}")))?;

        if teams.is_empty() {
            return Ok(Vec::new());
        }

        let team_ids: Vec<i64> = teams.iter().map(|t| t.id).collect();

        let mut member_counts: HashMap<i64, i64> = HashMap::new();
        let members = TeamMembers::find()
            .filter(MemberColumn::TeamId.is_in(team_ids.clone()))
            .filter(MemberColumn::RemovedAt.is_null())
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询团队成员失败: {e}")))?;
        for member in members {
            *member_counts.entry(member.team_id).or_default() += 1;
        }

        let evaluations: HashMap<i64, _> = Evaluations::find()
            .filter(EvaluationColumn::TeamId.is_in(team_ids))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询评分失败: {e}")))?
            .into_iter()
            .map(|e| (e.team_id, e))
            .collect();

        Ok(teams
            .into_iter()
            .map(|team| {
                let evaluation = evaluations.get(&team.id);
                MentorTeamSummary {
                    team_id: team.id,
                    member_count: member_counts.get(&team.id).copied().unwrap_or(0),
                    evaluation_status: evaluation
                        .and_then(|e| e.status.parse::<EvaluationStatus>().ok()),
                    group_score: evaluation.map(|e| Marks::from_halves(e.group_score_halves)),
                    status: team.status.parse::<TeamStatus>().unwrap_or(TeamStatus::Pending),
                    team_number: team.team_number,
                    project_title: team.project_title,
                    project_category: team.project_category,
                    batch: team.batch,
                }
            })
            .collect())
    }
}
