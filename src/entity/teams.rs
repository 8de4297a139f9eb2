//! 团队实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub team_number: String,
    pub project_title: String,
    pub project_category: String,
    pub batch: String,
    pub status: String,
    pub mentor_id: Option<i64>,
    pub lead_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
    #[sea_orm(has_one = "super::evaluations::Entity")]
    Evaluation,
    #[sea_orm(has_many = "super::proposals::Entity")]
    Proposals,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMembers.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluation.def()
    }
}

impl Related<super::proposals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型，`members` 需由调用方按顺序提供当前成员
    pub fn into_team(self, members: Vec<crate::models::teams::TeamMember>) -> crate::models::teams::Team {
        use crate::models::teams::{Team, TeamStatus};

        Team {
            id: self.id,
            team_number: self.team_number,
            project_title: self.project_title,
            project_category: self.project_category,
            batch: self.batch,
            status: self
                .status
                .parse::<TeamStatus>()
                .unwrap_or(TeamStatus::Pending),
            mentor_id: self.mentor_id,
            lead_id: self.lead_id,
            members,
            created_at: super::timestamp_to_utc(self.created_at),
            updated_at: super::timestamp_to_utc(self.updated_at),
        }
    }
}
