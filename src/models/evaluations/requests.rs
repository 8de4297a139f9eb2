use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::EvaluationStatus;

// 查询评分参数
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationQuery {
    pub team_id: Option<i64>,
}

// 创建/更新评分请求
//
// 分值字段保持原始数值，由 scoring::validate_evaluation 统一校验并换算。
// groupScore / externalEvaluatorMarks / totalIndividualMarks 不在此声明，
// 客户端即使提交也会被忽略。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationPayload {
    pub team_id: Option<i64>,
    pub poster_marks: Option<f64>,
    pub video_marks: Option<f64>,
    pub report_marks: Option<f64>,
    pub ppt_marks: Option<f64>,
    #[serde(default)]
    pub individual_evaluations: Vec<IndividualEvaluationInput>,
    pub external_evaluator_name: Option<String>,
    pub external_evaluator_email: Option<String>,
    /// 创建时缺省为 DRAFT，更新时缺省保持原状态
    pub status: Option<EvaluationStatus>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct IndividualEvaluationInput {
    pub team_member_id: Option<i64>,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub individual_score: Option<f64>,
    pub learning_contribution: Option<f64>,
    pub presentation_skill: Option<f64>,
    pub contribution_to_project: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_derived_fields_are_ignored() {
        let payload: EvaluationPayload = serde_json::from_value(serde_json::json!({
            "teamId": 7,
            "posterMarks": 2,
            "videoMarks": 3,
            "reportMarks": 2.5,
            "pptMarks": 3,
            "groupScore": 99,
            "individualEvaluations": [{
                "teamMemberId": 1,
                "memberName": "Asha",
                "individualScore": 2.5,
                "totalIndividualMarks": 100
            }],
            "status": "SUBMITTED"
        }))
        .unwrap();

        assert_eq!(payload.team_id, Some(7));
        assert_eq!(payload.report_marks, Some(2.5));
        assert_eq!(payload.status, Some(EvaluationStatus::Submitted));
        assert_eq!(payload.individual_evaluations.len(), 1);
        assert_eq!(payload.individual_evaluations[0].learning_contribution, None);
    }
}
