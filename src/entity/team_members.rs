//! 团队成员实体
//!
//! `removed_at` 非空的成员不属于当前成员，但保留记录以便历史评分引用。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub roll_number: Option<String>,
    pub position: i32,
    pub removed_at: Option<i64>,
    pub joined_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::individual_evaluations::Entity")]
    IndividualEvaluations,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::individual_evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndividualEvaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_team_member(self) -> crate::models::teams::TeamMember {
        use crate::models::teams::{MemberRole, TeamMember};

        TeamMember {
            id: self.id,
            team_id: self.team_id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            role: self.role.parse::<MemberRole>().unwrap_or(MemberRole::Member),
            roll_number: self.roll_number,
            position: self.position,
        }
    }
}
