use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Evaluation;
use crate::models::teams::TeamShell;
use crate::scoring::Marks;

/// 查询评分的结果：已有评分返回评分，否则返回团队快照
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct FetchEvaluationResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_shell: Option<TeamShell>,
}

impl FetchEvaluationResponse {
    pub fn found(evaluation: Evaluation) -> Self {
        Self {
            found: true,
            evaluation: Some(evaluation),
            team_shell: None,
        }
    }

    pub fn shell(team_shell: TeamShell) -> Self {
        Self {
            found: false,
            evaluation: None,
            team_shell: Some(team_shell),
        }
    }
}

/// 评分导出的一行（每个成员一行）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationExportRow {
    #[serde(rename = "Team Number")]
    pub team_number: String,
    #[serde(rename = "Project Title")]
    pub project_title: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Mentor Email")]
    pub mentor_email: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Member Name")]
    pub member_name: String,
    #[serde(rename = "Member Email")]
    pub member_email: String,
    #[serde(rename = "Poster")]
    pub poster_marks: Marks,
    #[serde(rename = "Video")]
    pub video_marks: Marks,
    #[serde(rename = "Report")]
    pub report_marks: Marks,
    #[serde(rename = "PPT")]
    pub ppt_marks: Marks,
    #[serde(rename = "Group Score")]
    pub group_score: Marks,
    #[serde(rename = "Individual Score")]
    pub individual_score: Marks,
    #[serde(rename = "Learning Contribution")]
    pub learning_contribution: Marks,
    #[serde(rename = "Presentation Skill")]
    pub presentation_skill: Marks,
    #[serde(rename = "Contribution To Project")]
    pub contribution_to_project: Marks,
    #[serde(rename = "External Evaluator Marks")]
    pub external_evaluator_marks: Marks,
    #[serde(rename = "Total")]
    pub total_individual_marks: Marks,
    #[serde(rename = "External Evaluator")]
    pub external_evaluator_name: String,
    #[serde(rename = "Evaluated At")]
    pub evaluated_at: String,
}
