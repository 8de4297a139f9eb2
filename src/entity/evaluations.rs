//! 团队评分实体

use sea_orm::entity::prelude::*;

use crate::scoring::Marks;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub team_id: i64,
    pub mentor_id: i64,
    pub poster_halves: i32,
    pub video_halves: i32,
    pub report_halves: i32,
    pub ppt_halves: i32,
    pub group_score_halves: i32,
    pub status: String,
    pub external_evaluator_name: Option<String>,
    pub external_evaluator_email: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub evaluated_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
    #[sea_orm(has_many = "super::individual_evaluations::Entity")]
    IndividualEvaluations,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::individual_evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndividualEvaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型，`rows` 需按成员顺序排列
    pub fn into_evaluation(
        self,
        rows: Vec<crate::models::evaluations::IndividualEvaluation>,
    ) -> crate::models::evaluations::Evaluation {
        use crate::models::evaluations::{Evaluation, EvaluationStatus};

        Evaluation {
            id: self.id,
            team_id: self.team_id,
            mentor_id: self.mentor_id,
            poster_marks: Marks::from_halves(self.poster_halves),
            video_marks: Marks::from_halves(self.video_halves),
            report_marks: Marks::from_halves(self.report_halves),
            ppt_marks: Marks::from_halves(self.ppt_halves),
            group_score: Marks::from_halves(self.group_score_halves),
            status: self
                .status
                .parse::<EvaluationStatus>()
                .unwrap_or(EvaluationStatus::Draft),
            external_evaluator_name: self.external_evaluator_name,
            external_evaluator_email: self.external_evaluator_email,
            remarks: self.remarks,
            individual_evaluations: rows,
            evaluated_at: super::timestamp_to_utc(self.evaluated_at),
            updated_at: super::timestamp_to_utc(self.updated_at),
        }
    }
}
