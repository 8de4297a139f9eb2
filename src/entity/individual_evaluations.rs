//! 成员个人评分实体

use sea_orm::entity::prelude::*;

use crate::models::teams::TeamMember;
use crate::scoring::Marks;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "individual_evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluation_id: i64,
    pub team_member_id: i64,
    pub member_name: String,
    pub member_email: String,
    pub position: i32,
    pub individual_score_halves: i32,
    pub learning_contribution_halves: i32,
    pub presentation_skill_halves: i32,
    pub contribution_to_project_halves: i32,
    pub external_evaluator_halves: i32,
    pub total_halves: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluations::Entity",
        from = "Column::EvaluationId",
        to = "super::evaluations::Column::Id"
    )]
    Evaluation,
    #[sea_orm(
        belongs_to = "super::team_members::Entity",
        from = "Column::TeamMemberId",
        to = "super::team_members::Column::Id"
    )]
    TeamMember,
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluation.def()
    }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_individual_evaluation(
        self,
        team_member: Option<TeamMember>,
    ) -> crate::models::evaluations::IndividualEvaluation {
        crate::models::evaluations::IndividualEvaluation {
            id: self.id,
            evaluation_id: self.evaluation_id,
            team_member_id: self.team_member_id,
            member_name: self.member_name,
            member_email: self.member_email,
            individual_score: Marks::from_halves(self.individual_score_halves),
            learning_contribution: Marks::from_halves(self.learning_contribution_halves),
            presentation_skill: Marks::from_halves(self.presentation_skill_halves),
            contribution_to_project: Marks::from_halves(self.contribution_to_project_halves),
            external_evaluator_marks: Marks::from_halves(self.external_evaluator_halves),
            total_individual_marks: Marks::from_halves(self.total_halves),
            team_member,
        }
    }
}
