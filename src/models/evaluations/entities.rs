use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::teams::TeamMember;
use crate::scoring::Marks;

// 评分状态
//
// SUBMITTED 之后仍可再次编辑，没有终态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum EvaluationStatus {
    Draft,
    Submitted,
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationStatus::Draft => write!(f, "DRAFT"),
            EvaluationStatus::Submitted => write!(f, "SUBMITTED"),
        }
    }
}

impl std::str::FromStr for EvaluationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(EvaluationStatus::Draft),
            "SUBMITTED" => Ok(EvaluationStatus::Submitted),
            _ => Err(format!("Invalid evaluation status: {s}")),
        }
    }
}

/// 团队评分（每个团队至多一条）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Evaluation {
    pub id: i64,
    pub team_id: i64,
    pub mentor_id: i64,
    #[ts(type = "number")]
    pub poster_marks: Marks,
    #[ts(type = "number")]
    pub video_marks: Marks,
    #[ts(type = "number")]
    pub report_marks: Marks,
    #[ts(type = "number")]
    pub ppt_marks: Marks,
    /// 四项小组分之和，写入时重新计算
    #[ts(type = "number")]
    pub group_score: Marks,
    pub status: EvaluationStatus,
    pub external_evaluator_name: Option<String>,
    pub external_evaluator_email: Option<String>,
    pub remarks: Option<String>,
    pub individual_evaluations: Vec<IndividualEvaluation>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 成员个人评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct IndividualEvaluation {
    pub id: i64,
    pub evaluation_id: i64,
    pub team_member_id: i64,
    pub member_name: String,
    pub member_email: String,
    #[ts(type = "number")]
    pub individual_score: Marks,
    #[ts(type = "number")]
    pub learning_contribution: Marks,
    #[ts(type = "number")]
    pub presentation_skill: Marks,
    #[ts(type = "number")]
    pub contribution_to_project: Marks,
    #[ts(type = "number")]
    pub external_evaluator_marks: Marks,
    #[ts(type = "number")]
    pub total_individual_marks: Marks,
    /// 关联的成员信息；成员已被移出团队时为空
    pub team_member: Option<TeamMember>,
}
