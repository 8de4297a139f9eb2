use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 团队状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum TeamStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamStatus::Pending => write!(f, "pending"),
            TeamStatus::Approved => write!(f, "approved"),
            TeamStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for TeamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TeamStatus::Pending),
            "approved" => Ok(TeamStatus::Approved),
            "rejected" => Ok(TeamStatus::Rejected),
            _ => Err(format!("Invalid team status: {s}")),
        }
    }
}

// 成员角色
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum MemberRole {
    Leader,
    Member,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::Leader => write!(f, "LEADER"),
            MemberRole::Member => write!(f, "MEMBER"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEADER" => Ok(MemberRole::Leader),
            "MEMBER" => Ok(MemberRole::Member),
            _ => Err(format!("Invalid member role: {s}")),
        }
    }
}

/// 团队成员
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamMember {
    pub id: i64,
    pub team_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub roll_number: Option<String>,
    /// 成员在团队中的顺序
    pub position: i32,
}

/// 团队（members 只包含当前成员，按 position 排序）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct Team {
    pub id: i64,
    pub team_number: String,
    pub project_title: String,
    pub project_category: String,
    pub batch: String,
    pub status: TeamStatus,
    pub mentor_id: Option<i64>,
    pub lead_id: i64,
    pub members: Vec<TeamMember>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Team {
    pub fn is_mentored_by(&self, user_id: i64) -> bool {
        self.mentor_id == Some(user_id)
    }

    /// 学生是否属于该团队（队长或当前成员）
    pub fn has_student(&self, user_id: i64) -> bool {
        self.lead_id == user_id || self.members.iter().any(|m| m.user_id == Some(user_id))
    }
}
