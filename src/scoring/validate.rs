//! 评分请求的整体校验
//!
//! 逐个检查所有有界字段与必填标识字段，一次性返回全部错误，
//! 通过后在此计算所有派生分值。

use std::collections::HashSet;

use super::{
    CRITERION_MAX, FieldError, INDIVIDUAL_MAX, Marks, POSTER_MAX, PPT_MAX, REPORT_MAX, VIDEO_MAX,
    external_evaluator_marks, grand_total, group_score, validate_bounds,
};
use crate::models::evaluations::{EvaluationPayload, EvaluationStatus, IndividualEvaluationInput};
use crate::utils::validate::validate_email;

/// 校验通过的评分，派生字段已计算
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvaluation {
    pub team_id: i64,
    pub poster_marks: Marks,
    pub video_marks: Marks,
    pub report_marks: Marks,
    pub ppt_marks: Marks,
    pub group_score: Marks,
    pub status: Option<EvaluationStatus>,
    pub external_evaluator_name: Option<String>,
    pub external_evaluator_email: Option<String>,
    pub remarks: Option<String>,
    pub members: Vec<ValidatedMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMember {
    pub team_member_id: i64,
    pub member_name: String,
    pub member_email: Option<String>,
    pub individual_score: Marks,
    pub learning_contribution: Marks,
    pub presentation_skill: Marks,
    pub contribution_to_project: Marks,
    pub external_evaluator_marks: Marks,
    pub total_individual_marks: Marks,
}

impl ValidatedEvaluation {
    pub fn member_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.members.iter().map(|m| m.team_member_id)
    }
}

/// 必填分值字段的校验
fn bounded(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>, max: Marks) -> Marks {
    match value {
        None => {
            errors.push(FieldError::missing(field));
            Marks::ZERO
        }
        Some(value) => validate_bounds(field, value, Marks::ZERO, max).unwrap_or_else(|err| {
            errors.push(err);
            Marks::ZERO
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_member(
    errors: &mut Vec<FieldError>,
    index: usize,
    input: &IndividualEvaluationInput,
    group: Marks,
) -> Option<ValidatedMember> {
    let prefix = format!("individualEvaluations[{index}]");
    let before = errors.len();

    let team_member_id = input.team_member_id;
    if team_member_id.is_none() {
        errors.push(FieldError::missing(format!("{prefix}.teamMemberId")));
    }

    let member_name = non_empty(&input.member_name);
    if member_name.is_none() {
        errors.push(FieldError::missing(format!("{prefix}.memberName")));
    }

    let member_email = non_empty(&input.member_email);
    if let Some(email) = &member_email
        && let Err(msg) = validate_email(email)
    {
        errors.push(FieldError::invalid(format!("{prefix}.memberEmail"), msg));
    }

    let individual_score = bounded(
        errors,
        &format!("{prefix}.individualScore"),
        input.individual_score,
        INDIVIDUAL_MAX,
    );
    let learning_contribution = bounded(
        errors,
        &format!("{prefix}.learningContribution"),
        input.learning_contribution,
        CRITERION_MAX,
    );
    let presentation_skill = bounded(
        errors,
        &format!("{prefix}.presentationSkill"),
        input.presentation_skill,
        CRITERION_MAX,
    );
    let contribution_to_project = bounded(
        errors,
        &format!("{prefix}.contributionToProject"),
        input.contribution_to_project,
        CRITERION_MAX,
    );

    if errors.len() != before {
        return None;
    }

    let external = external_evaluator_marks(
        learning_contribution,
        presentation_skill,
        contribution_to_project,
    );

    Some(ValidatedMember {
        team_member_id: team_member_id?,
        member_name: member_name?,
        member_email,
        individual_score,
        learning_contribution,
        presentation_skill,
        contribution_to_project,
        external_evaluator_marks: external,
        total_individual_marks: grand_total(group, individual_score, external),
    })
}

/// 校验评分请求并计算派生分值
pub fn validate_evaluation(
    request: &EvaluationPayload,
) -> Result<ValidatedEvaluation, Vec<FieldError>> {
    let mut errors = Vec::new();

    if request.team_id.is_none() {
        errors.push(FieldError::missing("teamId"));
    }

    let poster_marks = bounded(&mut errors, "posterMarks", request.poster_marks, POSTER_MAX);
    let video_marks = bounded(&mut errors, "videoMarks", request.video_marks, VIDEO_MAX);
    let report_marks = bounded(&mut errors, "reportMarks", request.report_marks, REPORT_MAX);
    let ppt_marks = bounded(&mut errors, "pptMarks", request.ppt_marks, PPT_MAX);
    let group = group_score(poster_marks, video_marks, report_marks, ppt_marks);

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(request.individual_evaluations.len());
    for (index, input) in request.individual_evaluations.iter().enumerate() {
        if let Some(id) = input.team_member_id
            && !seen.insert(id)
        {
            errors.push(FieldError::invalid(
                format!("individualEvaluations[{index}].teamMemberId"),
                format!("member {id} is listed more than once"),
            ));
        }
        if let Some(member) = validate_member(&mut errors, index, input, group) {
            members.push(member);
        }
    }

    let external_evaluator_email = non_empty(&request.external_evaluator_email);
    if let Some(email) = &external_evaluator_email
        && let Err(msg) = validate_email(email)
    {
        errors.push(FieldError::invalid("externalEvaluatorEmail", msg));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedEvaluation {
        team_id: request.team_id.ok_or_else(|| vec![FieldError::missing("teamId")])?,
        poster_marks,
        video_marks,
        report_marks,
        ppt_marks,
        group_score: group,
        status: request.status,
        external_evaluator_name: non_empty(&request.external_evaluator_name),
        external_evaluator_email,
        remarks: non_empty(&request.remarks),
        members,
    })
}
