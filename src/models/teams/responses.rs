use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{Team, TeamMember, TeamStatus};
use crate::models::evaluations::{Evaluation, EvaluationStatus};
use crate::models::proposals::{Proposal, ProposalState};
use crate::scoring::Marks;

/// 尚无评分记录时用于初始化空白表单的团队快照
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamShell {
    pub team_id: i64,
    pub team_number: String,
    pub project_title: String,
    pub batch: String,
    pub members: Vec<TeamMember>,
}

impl From<Team> for TeamShell {
    fn from(team: Team) -> Self {
        Self {
            team_id: team.id,
            team_number: team.team_number,
            project_title: team.project_title,
            batch: team.batch,
            members: team.members,
        }
    }
}

/// 导师名下的团队列表项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct MentorTeamSummary {
    pub team_id: i64,
    pub team_number: String,
    pub project_title: String,
    pub project_category: String,
    pub batch: String,
    pub status: TeamStatus,
    pub member_count: i64,
    pub evaluation_status: Option<EvaluationStatus>,
    #[ts(type = "number | null")]
    pub group_score: Option<Marks>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct MentorTeamListResponse {
    pub items: Vec<MentorTeamSummary>,
}

/// 用户摘要（导师、队长）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct UserBrief {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// 团队全貌：成员、导师、队长、申报（新的在前）与评分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamOverview {
    #[serde(flatten)]
    pub team: Team,
    pub mentor: Option<UserBrief>,
    pub lead: Option<UserBrief>,
    pub proposals: Vec<Proposal>,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamOverviewListResponse {
    pub items: Vec<TeamOverview>,
}

/// 团队所处阶段：有申报通过即进入执行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum TeamProgress {
    ProposalSubmission,
    ProposalAccepted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamStats {
    pub proposals: i64,
    pub members: i64,
    pub status: TeamProgress,
}

/// 学生视角的团队信息（不含评分）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct StudentTeamResponse {
    #[serde(flatten)]
    pub team: Team,
    pub mentor: Option<UserBrief>,
    pub lead: Option<UserBrief>,
    pub proposals: Vec<Proposal>,
    pub stats: TeamStats,
}

impl From<TeamOverview> for StudentTeamResponse {
    fn from(overview: TeamOverview) -> Self {
        let accepted = overview
            .proposals
            .iter()
            .any(|p| p.state == ProposalState::Approved);
        let stats = TeamStats {
            proposals: overview.proposals.len() as i64,
            members: overview.team.members.len() as i64,
            status: if accepted {
                TeamProgress::ProposalAccepted
            } else {
                TeamProgress::ProposalSubmission
            },
        };
        Self {
            team: overview.team,
            mentor: overview.mentor,
            lead: overview.lead,
            proposals: overview.proposals,
            stats,
        }
    }
}
