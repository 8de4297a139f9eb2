use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 申报状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/proposal.ts")]
pub enum ProposalState {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalState::Pending => write!(f, "PENDING"),
            ProposalState::Approved => write!(f, "APPROVED"),
            ProposalState::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for ProposalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ProposalState::Pending),
            "APPROVED" => Ok(ProposalState::Approved),
            "REJECTED" => Ok(ProposalState::Rejected),
            _ => Err(format!("Invalid proposal state: {s}")),
        }
    }
}

/// 项目申报
///
/// 三类附件均为逗号分隔的文件地址列表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/proposal.ts")]
pub struct Proposal {
    pub id: i64,
    pub team_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub attachment: String,
    pub poster_attachment: String,
    pub ppt_attachment: String,
    pub link: Option<String>,
    pub state: ProposalState,
    pub remarks: Option<String>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
