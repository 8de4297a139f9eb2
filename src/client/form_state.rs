//! 评分表单状态
//!
//! 表单同时保存服务端快照与编辑中的草稿。快照只会被整体替换，
//! 取消编辑即丢弃草稿回到快照。

use crate::models::evaluations::{Evaluation, EvaluationPayload, EvaluationStatus};
use crate::models::teams::TeamShell;
use crate::scoring::{Marks, external_evaluator_marks, grand_total, group_score, mentor_total};

use super::member_scores::MemberScores;

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<T> {
    server: T,
    draft: T,
}

impl<T: Clone + PartialEq> FormState<T> {
    pub fn new(server: T) -> Self {
        Self {
            draft: server.clone(),
            server,
        }
    }

    pub fn server(&self) -> &T {
        &self.server
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.server
    }

    pub fn edit(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.draft);
    }

    /// 放弃草稿
    pub fn revert(&mut self) {
        self.draft = self.server.clone();
    }

    /// 保存成功后以服务端返回值作为新快照
    pub fn commit(&mut self, server: T) {
        self.draft = server.clone();
        self.server = server;
    }
}

/// 评分表单草稿（原始输入，未校验）
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDraft {
    pub team_id: i64,
    pub poster_marks: f64,
    pub video_marks: f64,
    pub report_marks: f64,
    pub ppt_marks: f64,
    pub members: MemberScores,
    pub external_evaluator_name: String,
    pub external_evaluator_email: String,
    pub status: EvaluationStatus,
    pub remarks: String,
}

/// 草稿的分数预览；输入非 0.5 倍数时对应合计为空
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPreview {
    pub group_score: Option<Marks>,
    pub members: Vec<MemberPreview>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberPreview {
    pub team_member_id: i64,
    pub external_evaluator_marks: Option<Marks>,
    pub mentor_total: Option<Marks>,
    pub total_individual_marks: Option<Marks>,
}

impl EvaluationDraft {
    /// 尚无评分时由团队快照初始化
    pub fn from_shell(shell: &TeamShell) -> Self {
        Self {
            team_id: shell.team_id,
            poster_marks: 0.0,
            video_marks: 0.0,
            report_marks: 0.0,
            ppt_marks: 0.0,
            members: MemberScores::from_members(&shell.members),
            external_evaluator_name: String::new(),
            external_evaluator_email: String::new(),
            status: EvaluationStatus::Draft,
            remarks: String::new(),
        }
    }

    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            team_id: evaluation.team_id,
            poster_marks: evaluation.poster_marks.as_f64(),
            video_marks: evaluation.video_marks.as_f64(),
            report_marks: evaluation.report_marks.as_f64(),
            ppt_marks: evaluation.ppt_marks.as_f64(),
            members: MemberScores::from_rows(&evaluation.individual_evaluations),
            external_evaluator_name: evaluation.external_evaluator_name.clone().unwrap_or_default(),
            external_evaluator_email: evaluation
                .external_evaluator_email
                .clone()
                .unwrap_or_default(),
            status: evaluation.status,
            remarks: evaluation.remarks.clone().unwrap_or_default(),
        }
    }

    /// 与另一份草稿相比发生变化的字段
    pub fn changed_fields(&self, other: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        let scalar = [
            ("teamId", self.team_id != other.team_id),
            ("posterMarks", self.poster_marks != other.poster_marks),
            ("videoMarks", self.video_marks != other.video_marks),
            ("reportMarks", self.report_marks != other.report_marks),
            ("pptMarks", self.ppt_marks != other.ppt_marks),
            (
                "externalEvaluatorName",
                self.external_evaluator_name != other.external_evaluator_name,
            ),
            (
                "externalEvaluatorEmail",
                self.external_evaluator_email != other.external_evaluator_email,
            ),
            ("status", self.status != other.status),
            ("remarks", self.remarks != other.remarks),
        ];
        changed.extend(
            scalar
                .into_iter()
                .filter(|(_, differs)| *differs)
                .map(|(field, _)| field.to_string()),
        );

        if self.members.member_ids() != other.members.member_ids() {
            changed.push("individualEvaluations".to_string());
        } else {
            for (index, (id, score)) in self.members.iter().enumerate() {
                if other.members.get(id) != Some(score) {
                    changed.push(format!("individualEvaluations[{index}]"));
                }
            }
        }
        changed
    }

    /// 用评分汇总函数计算展示用合计
    pub fn preview(&self) -> DraftPreview {
        let group = match (
            Marks::from_f64(self.poster_marks),
            Marks::from_f64(self.video_marks),
            Marks::from_f64(self.report_marks),
            Marks::from_f64(self.ppt_marks),
        ) {
            (Some(poster), Some(video), Some(report), Some(ppt)) => {
                Some(group_score(poster, video, report, ppt))
            }
            _ => None,
        };

        let members = self
            .members
            .iter()
            .map(|(id, score)| {
                let individual = Marks::from_f64(score.individual_score);
                let external = match (
                    Marks::from_f64(score.learning_contribution),
                    Marks::from_f64(score.presentation_skill),
                    Marks::from_f64(score.contribution_to_project),
                ) {
                    (Some(l), Some(p), Some(c)) => Some(external_evaluator_marks(l, p, c)),
                    _ => None,
                };
                let mentor = group.zip(individual).map(|(g, i)| mentor_total(g, i));
                let total = match (group, individual, external) {
                    (Some(g), Some(i), Some(e)) => Some(grand_total(g, i, e)),
                    _ => None,
                };
                MemberPreview {
                    team_member_id: id,
                    external_evaluator_marks: external,
                    mentor_total: mentor,
                    total_individual_marks: total,
                }
            })
            .collect();

        DraftPreview {
            group_score: group,
            members,
        }
    }

    pub fn to_payload(&self) -> EvaluationPayload {
        fn optional(value: &str) -> Option<String> {
            Some(value.trim().to_string()).filter(|v| !v.is_empty())
        }

        EvaluationPayload {
            team_id: Some(self.team_id),
            poster_marks: Some(self.poster_marks),
            video_marks: Some(self.video_marks),
            report_marks: Some(self.report_marks),
            ppt_marks: Some(self.ppt_marks),
            individual_evaluations: self.members.to_inputs(),
            external_evaluator_name: optional(&self.external_evaluator_name),
            external_evaluator_email: optional(&self.external_evaluator_email),
            status: Some(self.status),
            remarks: optional(&self.remarks),
        }
    }
}
