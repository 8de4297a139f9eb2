//! 项目申报实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "proposals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    pub author_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub attachment: String,
    #[sea_orm(column_type = "Text")]
    pub poster_attachment: String,
    #[sea_orm(column_type = "Text")]
    pub ppt_attachment: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub link: Option<String>,
    pub state: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_proposal(self) -> crate::models::proposals::Proposal {
        use crate::models::proposals::{Proposal, ProposalState};

        Proposal {
            id: self.id,
            team_id: self.team_id,
            author_id: self.author_id,
            title: self.title,
            description: self.description,
            content: self.content,
            attachment: self.attachment,
            poster_attachment: self.poster_attachment,
            ppt_attachment: self.ppt_attachment,
            link: self.link,
            state: self
                .state
                .parse::<ProposalState>()
                .unwrap_or(ProposalState::Pending),
            remarks: self.remarks,
            reviewed_at: self.reviewed_at.map(super::timestamp_to_utc),
            created_at: super::timestamp_to_utc(self.created_at),
            updated_at: super::timestamp_to_utc(self.updated_at),
        }
    }
}
