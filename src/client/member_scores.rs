//! 按成员 ID 保存的个人评分输入，迭代顺序固定为团队成员列表顺序

use indexmap::IndexMap;

use crate::models::evaluations::{IndividualEvaluation, IndividualEvaluationInput};
use crate::models::teams::TeamMember;

/// 单个成员的原始输入（未校验）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberScore {
    pub member_name: String,
    pub member_email: String,
    pub individual_score: f64,
    pub learning_contribution: f64,
    pub presentation_skill: f64,
    pub contribution_to_project: f64,
}

impl MemberScore {
    pub fn blank(member: &TeamMember) -> Self {
        Self {
            member_name: member.name.clone(),
            member_email: member.email.clone(),
            ..Default::default()
        }
    }
}

impl From<&IndividualEvaluation> for MemberScore {
    fn from(row: &IndividualEvaluation) -> Self {
        Self {
            member_name: row.member_name.clone(),
            member_email: row.member_email.clone(),
            individual_score: row.individual_score.as_f64(),
            learning_contribution: row.learning_contribution.as_f64(),
            presentation_skill: row.presentation_skill.as_f64(),
            contribution_to_project: row.contribution_to_project.as_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberScores {
    entries: IndexMap<i64, MemberScore>,
}

impl MemberScores {
    /// 按成员列表顺序建立空白条目
    pub fn from_members(members: &[TeamMember]) -> Self {
        Self {
            entries: members
                .iter()
                .map(|m| (m.id, MemberScore::blank(m)))
                .collect(),
        }
    }

    pub fn from_rows(rows: &[IndividualEvaluation]) -> Self {
        Self {
            entries: rows
                .iter()
                .map(|row| (row.team_member_id, MemberScore::from(row)))
                .collect(),
        }
    }

    /// 插入或替换；新成员追加在末尾，已有成员保持原位置
    pub fn upsert(&mut self, member_id: i64, score: MemberScore) {
        self.entries.insert(member_id, score);
    }

    /// 删除给定成员，其余成员相对顺序不变
    pub fn remove_all(&mut self, member_ids: &[i64]) {
        for id in member_ids {
            self.entries.shift_remove(id);
        }
    }

    pub fn get(&self, member_id: i64) -> Option<&MemberScore> {
        self.entries.get(&member_id)
    }

    pub fn get_mut(&mut self, member_id: i64) -> Option<&mut MemberScore> {
        self.entries.get_mut(&member_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &MemberScore)> {
        self.entries.iter().map(|(id, score)| (*id, score))
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.entries.keys().copied().collect()
    }

    /// 与当前成员列表对齐：顺序跟随列表，移除已不在团队的成员，补齐新成员
    pub fn align_to(&mut self, members: &[TeamMember]) {
        let mut aligned = IndexMap::with_capacity(members.len());
        for member in members {
            let score = self
                .entries
                .shift_remove(&member.id)
                .unwrap_or_else(|| MemberScore::blank(member));
            aligned.insert(member.id, score);
        }
        self.entries = aligned;
    }

    pub fn to_inputs(&self) -> Vec<IndividualEvaluationInput> {
        self.iter()
            .map(|(id, score)| IndividualEvaluationInput {
                team_member_id: Some(id),
                member_name: Some(score.member_name.clone()),
                member_email: Some(score.member_email.clone()).filter(|e| !e.is_empty()),
                individual_score: Some(score.individual_score),
                learning_contribution: Some(score.learning_contribution),
                presentation_skill: Some(score.presentation_skill),
                contribution_to_project: Some(score.contribution_to_project),
            })
            .collect()
    }
}

/// 输入框失焦时把数值限制在区间内；非数值回落到下限
///
/// 仅用于界面提示，服务端会重新校验所有分值。
pub fn clamp_on_blur(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}
